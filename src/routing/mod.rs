//! Inbound path handling.
//!
//! # Data Flow
//! ```text
//! Incoming request path (/api/employee/profile)
//!     → path.rs (strip mount prefix, normalize segments)
//!     → LogicalPath ("employee/profile")
//!     → http::request (outbound URL construction)
//! ```

pub mod path;

pub use path::LogicalPath;
