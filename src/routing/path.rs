//! Logical path derivation.
//!
//! # Responsibilities
//! - Strip the mount prefix from the raw request path
//! - Split into segments, drop empty ones, rejoin with `/`
//!
//! # Design Decisions
//! - Raw pathname segments are percent-decoded, so deriving from the raw path and
//!   deriving from pre-parsed segments yield the same string
//! - Empty segments (trailing or doubled slashes) are ignored; the mount root maps
//!   to an empty path rather than being rejected
//! - Prefix matching is per segment: `/api` does not match `/apix`
//! - Escapes that do not decode to UTF-8 (e.g. `%FF`) become U+FFFD rather than
//!   failing the request; the backend sees `%EF%BF%BD` in their place

use std::fmt;

use percent_encoding::percent_decode_str;

/// The backend path derived from the inbound request, e.g. `employee/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogicalPath(String);

impl LogicalPath {
    /// Build from already-decoded path segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// Build from a raw (still percent-encoded) URL path by stripping `prefix`.
    ///
    /// Returns `None` if the path is not under the prefix.
    pub fn from_uri_path(prefix: &str, path: &str) -> Option<Self> {
        let rest = strip_mount_prefix(prefix, path)?;
        let segments = rest
            .split('/')
            .map(|s| percent_decode_str(s).decode_utf8_lossy());
        Some(Self::from_segments(segments))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_mount_prefix<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
