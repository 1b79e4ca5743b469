//! Combined dashboard report.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::auth::Operator;
use crate::handlers::{require, store_error, ApiError};
use crate::permissions::Permission;
use crate::state::AppState;
use ledgerpress_shared::{BlogStats, ContactStats};

/// Snapshot served to the reports screen.
#[derive(Debug, Serialize)]
pub struct Report {
    pub posts: BlogStats,
    pub contacts: ContactStats,
}

/// Blog and lead counts in one payload. The only admin surface a viewer
/// can reach.
pub async fn overview(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
) -> Result<Json<Report>, ApiError> {
    require(&operator, Permission::ViewReports)?;

    let posts = state
        .posts
        .stats()
        .await
        .map_err(|e| store_error("post stats", e))?;
    let contacts = state
        .contacts
        .stats()
        .await
        .map_err(|e| store_error("contact stats", e))?;
    Ok(Json(Report { posts, contacts }))
}
