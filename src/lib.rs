//! Google Apps Script proxy library.
//!
//! Forwards `GET {mount}/<segments>?<query>` to a fixed Apps Script web app as
//! `GET {base}?path=<segments>&<query>` and relays the answer with CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
