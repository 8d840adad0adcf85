/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// database URL, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Connection pool size (default: `20`).
    pub database_max_connections: u32,
}

/// A missing or malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `DATABASE_URL`             | required                |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", "u16", 3000u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    expected: "list of origins",
                    value: origin.clone(),
                });
            }
        }

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", "u64", 30u64)?;
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", "u32", 20u32)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            database_max_connections,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, ["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_max_connections, 20);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,,"),
        ]))
        .unwrap();

        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert_matches!(
            ServerConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn malformed_port_is_an_error() {
        let result = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "eighty"),
        ]));
        assert_matches!(result, Err(ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn unparseable_cors_origin_is_an_error() {
        let result = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("CORS_ORIGINS", "http://ok.test,bad\norigin"),
        ]));
        assert_matches!(result, Err(ConfigError::Invalid { name: "CORS_ORIGINS", .. }));
    }
}
