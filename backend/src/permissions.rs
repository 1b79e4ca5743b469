//! Fixed role → permission table, evaluated in-process per action.

use serde::{Deserialize, Serialize};

/// Coarse role attached to an operator's identity profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    /// Operators with no explicit role fall back to viewer.
    #[default]
    Viewer,
}

/// Dashboard capabilities an action may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageUsers,
    ManageBlog,
    ManageContacts,
    ManageGallery,
    ViewReports,
    EditSettings,
}

impl Role {
    /// Whether this role carries `permission`. The match is exhaustive:
    /// adding a role or permission forces this table to be revisited.
    pub fn allows(self, permission: Permission) -> bool {
        match (self, permission) {
            (Role::Admin, _) => true,

            (Role::Editor, Permission::ManageBlog)
            | (Role::Editor, Permission::ManageContacts)
            | (Role::Editor, Permission::ManageGallery)
            | (Role::Editor, Permission::ViewReports) => true,
            (Role::Editor, Permission::ManageUsers)
            | (Role::Editor, Permission::EditSettings) => false,

            (Role::Viewer, Permission::ViewReports) => true,
            (Role::Viewer, Permission::ManageUsers)
            | (Role::Viewer, Permission::ManageBlog)
            | (Role::Viewer, Permission::ManageContacts)
            | (Role::Viewer, Permission::ManageGallery)
            | (Role::Viewer, Permission::EditSettings) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Permission, Role};

    const ALL_PERMISSIONS: [Permission; 6] = [
        Permission::ManageUsers,
        Permission::ManageBlog,
        Permission::ManageContacts,
        Permission::ManageGallery,
        Permission::ViewReports,
        Permission::EditSettings,
    ];

    #[test]
    fn admin_holds_every_permission() {
        for p in ALL_PERMISSIONS {
            assert!(Role::Admin.allows(p), "admin missing {p:?}");
        }
    }

    #[test]
    fn editor_manages_content_but_not_users_or_settings() {
        assert!(Role::Editor.allows(Permission::ManageBlog));
        assert!(Role::Editor.allows(Permission::ManageContacts));
        assert!(Role::Editor.allows(Permission::ManageGallery));
        assert!(Role::Editor.allows(Permission::ViewReports));
        assert!(!Role::Editor.allows(Permission::ManageUsers));
        assert!(!Role::Editor.allows(Permission::EditSettings));
    }

    #[test]
    fn viewer_only_views_reports() {
        for p in ALL_PERMISSIONS {
            let expected = matches!(p, Permission::ViewReports);
            assert_eq!(Role::Viewer.allows(p), expected, "viewer vs {p:?}");
        }
    }

    #[test]
    fn missing_role_attribute_defaults_to_viewer() {
        assert_eq!(Role::default(), Role::Viewer);
        let parsed: Role = serde_json::from_str("\"editor\"").expect("role value");
        assert_eq!(parsed, Role::Editor);
    }
}
