//! Contact endpoints: the public lead form and the dashboard CRUD.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::Operator;
use crate::handlers::{require, store_error, Acknowledgement, ApiError};
use crate::permissions::Permission;
use crate::state::AppState;
use ledgerpress_shared::{Contact, ContactStats, ContactUpdate, NewContact};

/// Public lead form submission. Unauthenticated; every lead starts as
/// `new`.
pub async fn submit_lead(
    State(state): State<AppState>,
    Json(input): Json<NewContact>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let contact = state
        .contacts
        .create(input)
        .await
        .map_err(|e| store_error("submit lead", e))?;
    tracing::info!(contact = %contact.id, "lead captured");
    Ok(Json(Acknowledgement::new("thank you, we will be in touch")))
}

/// Dashboard list filter.
#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Dashboard listing, optionally filtered by a search term over
/// name/email/category.
pub async fn admin_list(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    require(&operator, Permission::ManageContacts)?;

    let contacts = match query.q.as_deref() {
        Some(term) => state.contacts.search(term).await,
        None => state.contacts.list().await,
    }
    .map_err(|e| store_error("list contacts", e))?;
    Ok(Json(contacts))
}

/// Manual dashboard entry. Same validation and starting status as the
/// public form.
pub async fn admin_create(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Json(input): Json<NewContact>,
) -> Result<Json<Contact>, ApiError> {
    require(&operator, Permission::ManageContacts)?;

    let contact = state
        .contacts
        .create(input)
        .await
        .map_err(|e| store_error("create contact", e))?;
    tracing::info!(operator = %operator.id, contact = %contact.id, "contact created");
    Ok(Json(contact))
}

/// Partial update, including status transitions. A bad status writes
/// nothing.
pub async fn admin_update(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> Result<Json<Contact>, ApiError> {
    require(&operator, Permission::ManageContacts)?;

    let contact = state
        .contacts
        .update(&id, update)
        .await
        .map_err(|e| store_error("update contact", e))?;
    tracing::info!(operator = %operator.id, contact = %contact.id, status = %contact.status, "contact updated");
    Ok(Json(contact))
}

pub async fn admin_delete(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageContacts)?;

    state
        .contacts
        .delete(&id)
        .await
        .map_err(|e| store_error("delete contact", e))?;
    tracing::info!(operator = %operator.id, contact = %id, "contact deleted");
    Ok(Json(Acknowledgement::new("contact deleted")))
}

pub async fn admin_stats(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
) -> Result<Json<ContactStats>, ApiError> {
    require(&operator, Permission::ManageContacts)?;

    let stats = state
        .contacts
        .stats()
        .await
        .map_err(|e| store_error("contact stats", e))?;
    Ok(Json(stats))
}
