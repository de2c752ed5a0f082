//! Outbound call to the Apps Script deployment.
//!
//! One GET per inbound request, awaited to completion. No timeout, no retry:
//! a backend that never answers holds the request until the client gives up.

use axum::http::{header, HeaderValue};

use crate::http::request::OutboundRequest;
use crate::http::response::{BackendBody, BackendResponse, ProxyError};

/// Issue the outbound GET and read the full body.
pub async fn fetch(
    client: &reqwest::Client,
    outbound: &OutboundRequest,
) -> Result<BackendResponse, ProxyError> {
    let response = client
        .get(&outbound.url)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    tracing::debug!(status = %status, body = %text, "Backend responded");

    let body = BackendBody::classify(text);
    tracing::debug!(kind = body.kind(), "Backend body classified");

    Ok(BackendResponse { status, body })
}
