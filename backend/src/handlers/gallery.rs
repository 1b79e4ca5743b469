//! Gallery endpoints: public listing plus dashboard upload and delete.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::auth::Operator;
use crate::handlers::{require, store_error, Acknowledgement, ApiError, ErrorResponse};
use crate::permissions::Permission;
use crate::state::AppState;
use ledgerpress_shared::GalleryImage;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    let images = state
        .gallery
        .list()
        .await
        .map_err(|e| store_error("list gallery", e))?;
    Ok(Json(images))
}

/// Same payload as the public listing, behind the session.
pub async fn admin_list(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    require(&operator, Permission::ManageGallery)?;
    let images = state
        .gallery
        .list()
        .await
        .map_err(|e| store_error("list gallery", e))?;
    Ok(Json(images))
}

/// Multipart upload. Expects one `file` part carrying a filename and an
/// image content type.
pub async fn admin_upload(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GalleryImage>, ApiError> {
    require(&operator, Permission::ManageGallery)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_upload(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| bad_upload("file part is missing a filename"))?;
        let mime_type = field
            .content_type()
            .map(ToOwned::to_owned)
            .ok_or_else(|| bad_upload("file part is missing a content type"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_upload(format!("failed to read upload: {e}")))?;

        let image = state
            .gallery
            .upload(&original_name, &mime_type, bytes.to_vec())
            .await
            .map_err(|e| store_error("upload image", e))?;
        tracing::info!(
            operator = %operator.id,
            image = %image.id,
            size = image.file_size,
            "image uploaded"
        );
        return Ok(Json(image));
    }

    Err(bad_upload("no `file` part in upload"))
}

pub async fn admin_delete(
    Extension(operator): Extension<Operator>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    require(&operator, Permission::ManageGallery)?;

    state
        .gallery
        .delete(&id)
        .await
        .map_err(|e| store_error("delete image", e))?;
    tracing::info!(operator = %operator.id, image = %id, "image deleted");
    Ok(Json(Acknowledgement::new("image deleted")))
}

fn bad_upload(message: impl Into<String>) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message.into(),
            code: 422,
        }),
    )
}
