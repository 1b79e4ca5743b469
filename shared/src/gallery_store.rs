//! Gallery store: blob uploads plus the metadata mirror table.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{StoreError, ValidationError};
use crate::rest::RestClient;
use crate::GalleryImage;

const GALLERY_TABLE: &str = "gallery";

/// Row inserted alongside each uploaded object.
#[derive(Debug, Clone, Serialize)]
struct GalleryRecord {
    filename: String,
    original_name: String,
    file_path: String,
    file_size: u64,
    mime_type: String,
}

/// Client for the provider's blob bucket API
/// (e.g. `https://x.example/storage/v1`).
#[derive(Debug, Clone)]
pub struct BlobClient {
    http: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl BlobClient {
    /// Build a client scoped to `bucket`.
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Self {
        BlobClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    /// Publicly reachable URL for an object path.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }

    /// Upload `bytes` as a new object at `path`.
    pub async fn upload(
        &self,
        path: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .post(format!("{}/object/{}/{}", self.base_url, self.bucket, path))
            .bearer_auth(&self.api_key)
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;
        self.check(response).await
    }

    /// Remove the object at `path`.
    pub async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(format!("{}/object/{}/{}", self.base_url, self.bucket, path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        self.check(response).await
    }

    async fn check(&self, response: reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            StatusCode::CONFLICT => Err(StoreError::Conflict(message)),
            _ => Err(StoreError::Provider {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

/// Store for gallery images: objects live in the blob bucket, metadata in
/// the `gallery` table, and the two are kept in step per operation.
#[derive(Debug, Clone)]
pub struct GalleryStore {
    rest: RestClient,
    blob: BlobClient,
}

impl GalleryStore {
    /// Build a store over the data and blob clients.
    pub fn new(rest: RestClient, blob: BlobClient) -> Self {
        GalleryStore { rest, blob }
    }

    /// All images, newest first, with public URLs attached.
    pub async fn list(&self) -> Result<Vec<GalleryImage>, StoreError> {
        let mut images: Vec<GalleryImage> = self
            .rest
            .select(GALLERY_TABLE, &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .await?;
        for image in &mut images {
            image.public_url = self.blob.public_url(&image.file_path);
        }
        Ok(images)
    }

    /// Upload an image and mirror its metadata. If the metadata insert
    /// fails the freshly uploaded object is removed again so the bucket
    /// and the table stay consistent.
    pub async fn upload(
        &self,
        original_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<GalleryImage, StoreError> {
        if bytes.is_empty() {
            return Err(ValidationError::new("file", "uploaded file is empty").into());
        }
        if !mime_type.starts_with("image/") {
            return Err(
                ValidationError::new("file", format!("`{mime_type}` is not an image type")).into(),
            );
        }

        let filename = stored_filename(original_name);
        let file_path = format!("gallery/{filename}");
        let file_size = bytes.len() as u64;

        self.blob.upload(&file_path, mime_type, bytes).await?;

        let record = GalleryRecord {
            filename,
            original_name: original_name.to_string(),
            file_path: file_path.clone(),
            file_size,
            mime_type: mime_type.to_string(),
        };
        let mut image: GalleryImage = match self.rest.insert(GALLERY_TABLE, &record).await {
            Ok(image) => image,
            Err(err) => {
                if let Err(cleanup) = self.blob.remove(&file_path).await {
                    tracing::warn!("failed to remove orphaned object {}: {}", file_path, cleanup);
                }
                return Err(err);
            },
        };
        image.public_url = self.blob.public_url(&image.file_path);
        Ok(image)
    }

    /// Delete the image with `id`: the object goes first, then the row.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let image: GalleryImage = self
            .rest
            .select_one(GALLERY_TABLE, &[
                ("select", "*".to_string()),
                ("id", format!("eq.{id}")),
            ])
            .await?
            .ok_or(StoreError::NotFound)?;

        self.blob.remove(&image.file_path).await?;
        self.rest.delete(GALLERY_TABLE, id).await
    }
}

/// Unique stored filename: upload instant plus a random suffix, keeping
/// the original extension.
fn stored_filename(original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    format!("{}-{}.{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple(), ext)
}
