//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Filter the inbound query string into the forwarded query
//! - Build the outbound backend URL
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The synthesized `path` parameter always wins; an inbound `path` is dropped
//! - Encoding matches what browsers' `encodeURIComponent` and `URLSearchParams` produce

use std::fmt;

use axum::http::{HeaderValue, Request};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;
use uuid::Uuid;

use crate::routing::LogicalPath;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Query parameter the backend reads the logical path from.
pub const PATH_PARAM: &str = "path";

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Inbound query parameters minus any literal `path` key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForwardedQuery(Vec<(String, String)>);

impl ForwardedQuery {
    /// Parse a raw query string and drop the reserved `path` parameter.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .filter(|(name, _)| name != PATH_PARAM)
                    .map(|(name, value)| (name.into_owned(), value.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self(pairs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ForwardedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.0)
            .finish();
        f.write_str(&encoded)
    }
}

/// The single GET issued to the backend for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub path: LogicalPath,
    pub url: String,
}

impl OutboundRequest {
    /// Build `{base}?path=<encoded>[&<forwarded>]`.
    pub fn new(base_url: &str, path: LogicalPath, query: ForwardedQuery) -> Self {
        let mut url = format!(
            "{base_url}?{PATH_PARAM}={}",
            utf8_percent_encode(path.as_str(), COMPONENT)
        );
        if !query.is_empty() {
            url.push('&');
            url.push_str(&query.to_string());
        }
        Self { path, url }
    }
}
