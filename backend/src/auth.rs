//! Session handling against the hosted identity provider.
//!
//! The provider owns sign-in, sign-up and profiles; this module only asks
//! "who is the operator behind this bearer token" once per request.

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Client;
use serde::Deserialize;

use crate::handlers::ErrorResponse;
use crate::permissions::Role;
use crate::state::AppState;

/// Authenticated dashboard operator, resolved from the session token and
/// attached to the request as an extension.
#[derive(Debug, Clone, Deserialize)]
pub struct Operator {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub banned: bool,
}

/// Client for the identity provider's session endpoint.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
}

impl IdentityClient {
    /// Build a client for the provider at `base_url`.
    pub fn new(base_url: &str) -> Self {
        IdentityClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the operator behind `token`. `Ok(None)` means the token is
    /// unknown or expired; errors mean the provider itself failed.
    pub async fn session_operator(&self, token: &str) -> Result<Option<Operator>> {
        let response = self
            .http
            .get(format!("{}/v1/session", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .context("identity provider unreachable")?;

        match response.status().as_u16() {
            200 => {
                let operator = response
                    .json::<Operator>()
                    .await
                    .context("invalid session payload from identity provider")?;
                Ok(Some(operator))
            },
            401 | 403 | 404 => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("identity provider error ({status}): {body}")
            },
        }
    }
}

/// Middleware guarding the dashboard surface: resolves the bearer token
/// to an [`Operator`] or rejects the request.
pub async fn require_operator(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return unauthorized("missing session token");
    };

    let operator = match state.identity.session_operator(&token).await {
        Ok(Some(operator)) => operator,
        Ok(None) => return unauthorized("session is not active"),
        Err(err) => {
            tracing::error!("failed to resolve session: {:#}", err);
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "identity provider unavailable".to_string(),
                    code: 502,
                }),
            )
                .into_response();
        },
    };

    if operator.banned {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "account is banned".to_string(),
                code: 403,
            }),
        )
            .into_response();
    }

    request.extensions_mut().insert(operator);
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: 401,
        }),
    )
        .into_response()
}
