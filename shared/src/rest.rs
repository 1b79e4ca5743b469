//! Thin client for the hosted provider's PostgREST-flavored data API.
//!
//! Every call is attempted exactly once; retries and timeouts are left to
//! the transport and the provider.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Upper bound on provider error bodies kept for logs and messages.
const ERROR_BODY_LIMIT: usize = 512;

/// Client for one provider data endpoint (e.g. `https://x.example/rest/v1`).
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    /// Build a client for `base_url`, authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        RestClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Fetch all rows of `table` matching the PostgREST query `params`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self.request(Method::GET, table).query(params).send().await?;
        let response = check_status(response).await?;
        decode_rows(response).await
    }

    /// Fetch at most one row; `params` are extended with `limit=1`.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, StoreError> {
        let response = self
            .request(Method::GET, table)
            .query(params)
            .query(&[("limit", "1")])
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows: Vec<T> = decode_rows(response).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let response = check_status(response).await?;
        first_row(decode_rows(response).await?)
    }

    /// Patch the row with primary key `id` and return the stored
    /// representation. A patch that matches no row is [`StoreError::NotFound`].
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: &B,
    ) -> Result<T, StoreError> {
        let response = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let response = check_status(response).await?;
        let mut rows: Vec<T> = decode_rows(response).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(rows.remove(0))
    }

    /// Delete the row with primary key `id`.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = truncated_body(response).await;
    match status {
        StatusCode::NOT_FOUND => Err(StoreError::NotFound),
        StatusCode::CONFLICT => Err(StoreError::Conflict(message)),
        _ => Err(StoreError::Provider {
            status: status.as_u16(),
            message,
        }),
    }
}

async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn first_row<T>(rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode("provider returned no representation".to_string()))
}

async fn truncated_body(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    if body.chars().count() > ERROR_BODY_LIMIT {
        let truncated: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{truncated}…")
    } else {
        body
    }
}
