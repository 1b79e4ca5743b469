//! HTTP handlers.
//!
//! Handlers stay thin: decode, check the operator's permission, call the
//! store, map the error. Provider failures are logged server-side and
//! surface to the client as a generic message.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::auth::Operator;
use crate::permissions::Permission;
use ledgerpress_shared::StoreError;

pub mod blog;
pub mod contacts;
pub mod gallery;
pub mod reports;
pub mod users;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Generic acknowledgement for operations with no payload to return.
#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Acknowledgement {
            success: true,
            message: message.into(),
        }
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: status.as_u16(),
        }),
    )
}

/// Plain 404 for lookups that came back empty.
pub fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not found")
}

/// Log the real error, answer with a generic 500.
pub fn internal_error<E: std::fmt::Display>(message: &str, err: E) -> ApiError {
    tracing::error!("{}: {}", message, err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Map a store failure onto the response taxonomy. Validation problems
/// carry the offending field back to the caller; provider problems are
/// logged and answered generically. Nothing is retried.
pub fn store_error(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => api_error(StatusCode::NOT_FOUND, "not found"),
        StoreError::Conflict(message) => {
            tracing::warn!("{}: conflict: {}", context, message);
            api_error(StatusCode::CONFLICT, "conflicting record already exists")
        },
        StoreError::Validation(err) => api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        StoreError::Provider { status, message } => {
            tracing::error!("{}: provider error ({}): {}", context, status, message);
            api_error(StatusCode::BAD_GATEWAY, "storage provider unavailable")
        },
        StoreError::Transport(err) => {
            tracing::error!("{}: transport error: {}", context, err);
            api_error(StatusCode::BAD_GATEWAY, "storage provider unavailable")
        },
        StoreError::Decode(message) => {
            tracing::error!("{}: decode error: {}", context, message);
            internal_error("unexpected provider payload", message)
        },
    }
}

/// Reject the request unless the operator's role carries `permission`.
pub fn require(operator: &Operator, permission: Permission) -> Result<(), ApiError> {
    if operator.role.allows(permission) {
        return Ok(());
    }
    tracing::warn!(
        operator = %operator.id,
        role = ?operator.role,
        "denied {:?}",
        permission
    );
    Err(api_error(StatusCode::FORBIDDEN, "insufficient permissions"))
}
