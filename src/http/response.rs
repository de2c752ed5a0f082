//! Response handling and transformation.
//!
//! # Responsibilities
//! - Classify the backend body as JSON or opaque text
//! - Relay the backend status unchanged
//! - Map handler failures to the `{success:false, error:{...}}` envelope
//!
//! # Design Decisions
//! - Backend error statuses are passed through, never translated
//! - JSON bodies are relayed as the exact bytes the backend sent; the parsed
//!   value is for inspection only, so key order and number text survive
//! - Every failure is terminal for the request; nothing is retried

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Backend response body, parsed opportunistically.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendBody {
    Json { value: Value, raw: String },
    Text(String),
}

impl BackendBody {
    /// Try JSON first, fall back to the raw text.
    pub fn classify(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json { value, raw: text },
            Err(_) => Self::Text(text),
        }
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::Text(_) => "text",
        }
    }
}

/// A fully read backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: BackendBody,
}

impl IntoResponse for BackendResponse {
    fn into_response(self) -> Response {
        let (content_type, text) = match self.body {
            BackendBody::Json { raw, .. } => ("application/json", raw),
            BackendBody::Text(text) => ("text/plain; charset=utf-8", text),
        };
        (
            self.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
            text,
        )
            .into_response()
    }
}

/// Everything that can stop a request before the backend answers.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("GAS_BASE_URL is not configured")]
    MissingBaseUrl,

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingBaseUrl | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::MissingBaseUrl => "MISSING_GAS_BASE_URL",
            Self::Upstream(_) => "PROXY_ERROR",
        }
    }

    // reqwest's Display omits the underlying cause (DNS, refused, ...).
    fn message(&self) -> String {
        match self {
            Self::Upstream(e) => {
                let mut message = e.to_string();
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    message.push_str(": ");
                    message.push_str(&cause.to_string());
                    source = cause.source();
                }
                message
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    message: String,
    code: &'a str,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorDetail {
                message: self.message(),
                code: self.code(),
            },
        };
        (self.status(), Json(envelope)).into_response()
    }
}
