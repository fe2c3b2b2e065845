//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing services)
//! - Validate value ranges (limits > 0, timeouts > 0)
//! - Reject exclusion patterns that do not compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("auth.secret must be set")]
    MissingSecret,

    #[error("auth.algorithm `{0}` is not a supported HMAC algorithm")]
    UnsupportedAlgorithm(String),

    #[error("auth.excluded_paths pattern `{pattern}` is invalid: {reason}")]
    InvalidExclusion { pattern: String, reason: String },

    #[error("rate_limit.{0} must be greater than zero")]
    ZeroRateLimit(&'static str),

    #[error("timeouts.upstream_secs must be a positive, representable number of seconds")]
    InvalidTimeout,

    #[error("service `{name}` has invalid base URL `{url}`: {reason}")]
    InvalidServiceUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("route `{prefix}` must start with `/`")]
    InvalidPrefix { prefix: String },

    #[error("route `{prefix}` references unknown service `{service}`")]
    UnknownService { prefix: String, service: String },
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.secret.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }

    match Algorithm::from_str(&config.auth.algorithm) {
        Ok(Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) => {}
        _ => errors.push(ValidationError::UnsupportedAlgorithm(
            config.auth.algorithm.clone(),
        )),
    }

    for pattern in &config.auth.excluded_paths {
        if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::InvalidExclusion {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.rate_limit.requests_per_minute == 0 {
        errors.push(ValidationError::ZeroRateLimit("requests_per_minute"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateLimit("window_secs"));
    }

    let timeout = config.timeouts.upstream_secs;
    if timeout <= 0.0 || Duration::try_from_secs_f64(timeout).is_err() {
        errors.push(ValidationError::InvalidTimeout);
    }

    for (name, url) in &config.services {
        if let Err(reason) = check_service_url(url) {
            errors.push(ValidationError::InvalidServiceUrl {
                name: name.clone(),
                url: url.clone(),
                reason,
            });
        }
    }

    for route in &config.routes {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                prefix: route.prefix.clone(),
            });
        }
        if !config.services.contains_key(&route.service) {
            errors.push(ValidationError::UnknownService {
                prefix: route.prefix.clone(),
                service: route.service.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_service_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("scheme `{}` is not supported", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("base URL must not carry a query or fragment".to_string());
    }
    Ok(())
}
