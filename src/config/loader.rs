//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix for every environment override.
pub const ENV_PREFIX: &str = "GW_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: String, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply `GW_*` overrides
/// from the process environment and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `GW_*` overrides using `lookup` as the variable source.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("ENV") {
        config.environment = v;
    }
    if let Some(v) = var("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = var("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = var("JWT_SECRET_KEY") {
        config.auth.secret = v;
    }
    if let Some(v) = var("JWT_ALGORITHM") {
        config.auth.algorithm = v;
    }
    if let Some(v) = var("JWT_EXPIRY_SECONDS") {
        config.auth.token_expiry_secs = parse_var("JWT_EXPIRY_SECONDS", &v)?;
    }
    if let Some(v) = var("RATE_LIMIT_RPM") {
        config.rate_limit.requests_per_minute = parse_var("RATE_LIMIT_RPM", &v)?;
    }
    if let Some(v) = var("HTTP_TIMEOUT") {
        config.timeouts.upstream_secs = parse_var("HTTP_TIMEOUT", &v)?;
    }
    if let Some(v) = var("CORS_ORIGINS") {
        config.cors.origins = parse_list("CORS_ORIGINS", &v)?;
    }
    if let Some(v) = var("AUTH_EXCLUDED_PATHS") {
        config.auth.excluded_paths = parse_list("AUTH_EXCLUDED_PATHS", &v)?;
    }

    // GW_USER_SERVICE_URL → services["user"]
    for (name, url) in config.services.iter_mut() {
        let key = format!("{}_SERVICE_URL", name.to_ascii_uppercase().replace('-', "_"));
        if let Some(v) = var(&key) {
            *url = v;
        }
    }

    Ok(())
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var: format!("{ENV_PREFIX}{name}"),
        reason: e.to_string(),
    })
}

/// Lists are JSON arrays (`["/docs","/metrics"]`); a bare string is
/// accepted as comma-separated values.
fn parse_list(name: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| ConfigError::Env {
            var: format!("{ENV_PREFIX}{name}"),
            reason: e.to_string(),
        });
    }
    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("GW_JWT_SECRET_KEY", "from-env"),
                ("GW_RATE_LIMIT_RPM", "5"),
                ("GW_HTTP_TIMEOUT", "2.5"),
                ("GW_ORDER_SERVICE_URL", "http://127.0.0.1:9000"),
                ("GW_AUTH_EXCLUDED_PATHS", r#"["/open", "/public/.*"]"#),
                ("GW_CORS_ORIGINS", "https://a.example, https://b.example"),
            ]),
        )
        .unwrap();

        assert_eq!(config.auth.secret, "from-env");
        assert_eq!(config.rate_limit.requests_per_minute, 5);
        assert_eq!(config.timeouts.upstream_secs, 2.5);
        assert_eq!(config.services["order"], "http://127.0.0.1:9000");
        assert_eq!(config.services["user"], "http://user-service:8001");
        assert_eq!(config.auth.excluded_paths, vec!["/open", "/public/.*"]);
        assert_eq!(
            config.cors.origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_bad_env_value_names_the_variable() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("GW_RATE_LIMIT_RPM", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("GW_RATE_LIMIT_RPM"), "{err}");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "fleetbite-gateway-config-{}.toml",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [auth]
            secret = "file-secret"

            [rate_limit]
            requests_per_minute = 7
            "#
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.rate_limit.requests_per_minute, 7);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_validation_failure_is_reported() {
        let path = std::env::temp_dir().join(format!(
            "fleetbite-gateway-invalid-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[rate_limit]\nrequests_per_minute = 0\n[auth]\nsecret = \"x\"\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        let _ = fs::remove_file(&path);

        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1), "{err}");
    }
}
