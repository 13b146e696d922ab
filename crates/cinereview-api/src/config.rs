//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;

/// Server settings. Only `DATABASE_URL` and `JWT_SECRET` are required.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub token_ttl_hours: i64,
    pub review_event_capacity: usize,
    pub auth_rate_limit_per_minute: u32,
    pub run_migrations: bool,
    /// OTLP collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_max_connections", &self.database_max_connections)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("review_event_capacity", &self.review_event_capacity)
            .field("auth_rate_limit_per_minute", &self.auth_rate_limit_per_minute)
            .field("run_migrations", &self.run_migrations)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };

        let review_event_capacity: usize = parse_or(&lookup, "REVIEW_EVENT_CAPACITY", 100)?;
        if review_event_capacity == 0 {
            return Err(AppError::Config(
                "REVIEW_EVENT_CAPACITY must be at least 1".into(),
            ));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&lookup, "PORT", 8080)?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            token_ttl_hours: parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?,
            review_event_capacity,
            auth_rate_limit_per_minute: parse_or(&lookup, "AUTH_RATE_LIMIT_PER_MINUTE", 20)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/cinereview"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn test_defaults_apply_when_only_required_vars_are_set() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.review_event_capacity, 100);
        assert_eq!(config.auth_rate_limit_per_minute, 20);
        assert!(config.run_migrations);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_missing_jwt_secret_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]));

        match result.unwrap_err() {
            AppError::Config(msg) => assert!(msg.contains("JWT_SECRET")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));

        let result = AppConfig::from_lookup(lookup_from(&vars));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_event_capacity_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REVIEW_EVENT_CAPACITY", "0"));

        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&vars)),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("RUN_MIGRATIONS", "false"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ]);

        let config = AppConfig::from_lookup(lookup_from(&vars)).unwrap();

        assert!(!config.run_migrations);
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:3000");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
    }
}
