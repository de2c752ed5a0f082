//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS + request ID layers, method gate)
//!     → routing::path (derive logical path)
//!     → request.rs (forwarded query, outbound URL)
//!     → upstream.rs (single GET to the Apps Script deployment)
//!     → response.rs (JSON-or-text body, error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::{ForwardedQuery, OutboundRequest, X_REQUEST_ID};
pub use response::{BackendBody, BackendResponse, ProxyError};
pub use server::HttpServer;
