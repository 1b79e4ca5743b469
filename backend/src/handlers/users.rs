//! User management endpoints.
//!
//! Accounts live in the identity provider and are administered in its own
//! console. These endpoints keep the dashboard screens functional: the
//! listing serves a fixed development roster, and the mutations log the
//! intent and acknowledge without changing anything.

use axum::extract::Path;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::Operator;
use crate::handlers::{require, Acknowledgement, ApiError};
use crate::permissions::{Permission, Role};

/// Dashboard user row.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub banned: bool,
}

fn development_roster() -> Vec<ManagedUser> {
    vec![
        ManagedUser {
            id: "user-admin".to_string(),
            email: "admin@ledgerpress.example".to_string(),
            name: "Administrador".to_string(),
            role: Role::Admin,
            banned: false,
        },
        ManagedUser {
            id: "user-editor".to_string(),
            email: "editor@ledgerpress.example".to_string(),
            name: "Editor de Conteúdo".to_string(),
            role: Role::Editor,
            banned: false,
        },
        ManagedUser {
            id: "user-viewer".to_string(),
            email: "viewer@ledgerpress.example".to_string(),
            name: "Analista".to_string(),
            role: Role::Viewer,
            banned: false,
        },
    ]
}

pub async fn list(
    Extension(operator): Extension<Operator>,
) -> Result<Json<Vec<ManagedUser>>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    Ok(Json(development_roster()))
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

pub async fn invite(
    Extension(operator): Extension<Operator>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    tracing::info!(
        operator = %operator.id,
        email = %request.email,
        role = ?request.role,
        "user invite requested"
    );
    Ok(Json(Acknowledgement::new("invitation recorded")))
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

pub async fn update(
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    tracing::info!(
        operator = %operator.id,
        user = %id,
        role = ?request.role,
        name = ?request.name,
        "user update requested"
    );
    Ok(Json(Acknowledgement::new("user update recorded")))
}

pub async fn ban(
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    tracing::info!(operator = %operator.id, user = %id, "user ban requested");
    Ok(Json(Acknowledgement::new("ban recorded")))
}

pub async fn unban(
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    tracing::info!(operator = %operator.id, user = %id, "user unban requested");
    Ok(Json(Acknowledgement::new("unban recorded")))
}

pub async fn remove(
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageUsers)?;
    tracing::info!(operator = %operator.id, user = %id, "user removal requested");
    Ok(Json(Acknowledgement::new("removal recorded")))
}
