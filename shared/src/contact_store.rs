//! Contact (lead) store and status rules.
//!
//! Lead statuses form a flat enumeration: any status can follow any
//! other, always by explicit operator action. Nothing here transitions
//! on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, ValidationError};
use crate::rest::RestClient;
use crate::{Contact, ContactStats, ContactUpdate, LeadStatus, NewContact};

const CONTACTS_TABLE: &str = "contacts";

/// Row sent to the provider when capturing a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub category: crate::ContactCategory,
    pub employees: crate::EmployeeBracket,
    pub status: LeadStatus,
    pub notes: Option<String>,
}

/// Sparse patch for an existing contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<crate::ContactCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<crate::EmployeeBracket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a lead form submission. Every new lead starts as `new`;
/// the form cannot choose a status.
pub fn build_contact_record(input: NewContact) -> Result<ContactRecord, ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    validate_email(&input.email)?;

    Ok(ContactRecord {
        name: input.name,
        email: input.email,
        category: input.category,
        employees: input.employees,
        status: LeadStatus::New,
        notes: input.notes,
    })
}

/// Merge a partial update. The status arrives as a raw string and must
/// parse into [`LeadStatus`]; anything else fails validation and nothing
/// is written.
pub fn apply_contact_update(
    update: ContactUpdate,
    now: DateTime<Utc>,
) -> Result<ContactPatch, ValidationError> {
    let mut patch = ContactPatch {
        updated_at: now,
        ..ContactPatch::default()
    };

    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        patch.name = Some(name);
    }
    if let Some(email) = update.email {
        validate_email(&email)?;
        patch.email = Some(email);
    }
    if let Some(status) = update.status {
        patch.status = Some(LeadStatus::parse(&status)?);
    }
    patch.category = update.category;
    patch.employees = update.employees;
    patch.notes = update.notes;

    Ok(patch)
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }
    // Minimal shape check; the mail never originates here.
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ValidationError::new("email", format!("`{email}` is not an email address")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct StatusColumn {
    status: LeadStatus,
}

/// Store for contacts, backed by the provider's `contacts` table.
#[derive(Debug, Clone)]
pub struct ContactStore {
    rest: RestClient,
}

impl ContactStore {
    /// Build a store over `rest`.
    pub fn new(rest: RestClient) -> Self {
        ContactStore { rest }
    }

    /// All contacts, newest first.
    pub async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        self.rest
            .select(CONTACTS_TABLE, &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .await
    }

    /// Dashboard search over name/email/category.
    pub async fn search(&self, term: &str) -> Result<Vec<Contact>, StoreError> {
        let term: String = term
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"'))
            .collect();
        if term.is_empty() {
            return self.list().await;
        }
        self.rest
            .select(CONTACTS_TABLE, &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                (
                    "or",
                    format!("(name.ilike.*{term}*,email.ilike.*{term}*,category.ilike.*{term}*)"),
                ),
            ])
            .await
    }

    /// Capture a lead (public form or manual dashboard entry).
    pub async fn create(&self, input: NewContact) -> Result<Contact, StoreError> {
        let record = build_contact_record(input)?;
        self.rest.insert(CONTACTS_TABLE, &record).await
    }

    /// Apply a partial update (including status transitions) to the
    /// contact with `id`. Status changes persist immediately; there is
    /// no pending state.
    pub async fn update(&self, id: &str, update: ContactUpdate) -> Result<Contact, StoreError> {
        let patch = apply_contact_update(update, Utc::now())?;
        self.rest.update(CONTACTS_TABLE, id, &patch).await
    }

    /// Delete the contact with `id`.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.rest.delete(CONTACTS_TABLE, id).await
    }

    /// Lead counts by status, computed from a status-only projection.
    pub async fn stats(&self) -> Result<ContactStats, StoreError> {
        let rows: Vec<StatusColumn> = self
            .rest
            .select(CONTACTS_TABLE, &[("select", "status".to_string())])
            .await?;
        let mut stats = ContactStats {
            total: rows.len(),
            new: 0,
            contacted: 0,
            customers: 0,
            lost: 0,
        };
        for row in rows {
            match row.status {
                LeadStatus::New => stats.new += 1,
                LeadStatus::Contacted => stats.contacted += 1,
                LeadStatus::Customer => stats.customers += 1,
                LeadStatus::Lost => stats.lost += 1,
            }
        }
        Ok(stats)
    }
}
