//! Per-request context: a request id (accepted from the caller or
//! generated), a span wrapping the handler, and a completion log line.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::extract::Request;
use axum::http::{header::HeaderName, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = read_or_generate_id(request.headers());

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    set_response_header(response.headers_mut(), REQUEST_ID_HEADER, request_id.as_str());

    tracing::info!(
        parent: &span,
        status = response.status().as_u16(),
        elapsed_ms = started_at.elapsed().as_millis(),
        "request completed"
    );

    response
}

fn read_or_generate_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(generate_id)
}

fn generate_id() -> String {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_nanos())
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{now_ns:032x}-{counter:016x}")
}

fn set_response_header(headers: &mut HeaderMap, header_name: &'static str, value: &str) {
    let Ok(header_value) = HeaderValue::from_str(value) else {
        return;
    };
    headers.insert(HeaderName::from_static(header_name), header_value);
}
