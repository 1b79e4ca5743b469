//! Environment-driven configuration.

use std::env;

use anyhow::{Context, Result};
use url::Url;

/// Startup configuration, read once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind; defaults to `0.0.0.0`.
    pub bind_addr: String,
    /// Port to bind; defaults to 3000.
    pub port: u16,
    /// Base URL of the provider's data API (PostgREST-style).
    pub storage_url: String,
    /// Base URL of the provider's blob bucket API.
    pub storage_blob_url: String,
    /// API key sent with every provider call.
    pub storage_api_key: String,
    /// Bucket holding gallery objects; defaults to `gallery`.
    pub gallery_bucket: String,
    /// Base URL of the identity provider.
    pub identity_url: String,
}

impl AppConfig {
    /// Read configuration from the environment. The provider endpoints
    /// and API key are required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let storage_url = required_url("STORAGE_URL")?;
        let storage_blob_url = required_url("STORAGE_BLOB_URL")?;
        let identity_url = required_url("IDENTITY_URL")?;
        let storage_api_key =
            env::var("STORAGE_API_KEY").context("STORAGE_API_KEY is required")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a number")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let gallery_bucket = env::var("GALLERY_BUCKET").unwrap_or_else(|_| "gallery".to_string());

        Ok(AppConfig {
            bind_addr,
            port,
            storage_url,
            storage_blob_url,
            storage_api_key,
            gallery_bucket,
            identity_url,
        })
    }
}

fn required_url(name: &str) -> Result<String> {
    let raw = env::var(name).with_context(|| format!("{name} is required"))?;
    let parsed = Url::parse(raw.trim()).with_context(|| format!("{name} is not a valid URL"))?;
    match parsed.scheme() {
        "http" | "https" => {},
        other => anyhow::bail!("{name} must use http or https, got {other}"),
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}
