//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the mount prefix, and the backend URL shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("mount prefix `{0}` must start with `/`, must not end with `/`, and must not contain route wildcards")]
    MountPrefix(String),

    #[error("invalid backend base URL `{url}`: {reason}")]
    BaseUrl { url: String, reason: String },
}

/// Check a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if !is_valid_mount_prefix(&config.backend.mount_prefix) {
        errors.push(ValidationError::MountPrefix(
            config.backend.mount_prefix.clone(),
        ));
    }

    if let Some(base_url) = &config.backend.base_url {
        if let Err(reason) = check_base_url(base_url) {
            errors.push(ValidationError::BaseUrl {
                url: base_url.clone(),
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_mount_prefix(prefix: &str) -> bool {
    prefix.len() > 1
        && prefix.starts_with('/')
        && !prefix.ends_with('/')
        && !prefix.contains(['{', '}', '*'])
}

// The outbound URL is built by appending `?path=...`, so the base must not
// already carry a query or fragment.
fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.query().is_some() {
        return Err("must not contain a query string".to_string());
    }
    if url.fragment().is_some() {
        return Err("must not contain a fragment".to_string());
    }
    Ok(())
}
