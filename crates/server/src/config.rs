// Server configuration.
//
// Centralizes environment variable parsing with defaults for local
// development. Pool sizing lives in `db::pool::PoolConfig` and is read here
// so the binary only consults the environment once.

use std::net::SocketAddr;

use chrono::Duration;

use crate::{
    auth::tokens::{RESET_TOKEN_TTL_MINUTES, SESSION_TOKEN_TTL_HOURS},
    db::pool::PoolConfig,
};

const DEV_JWT_SECRET: &str = "noteforge_local_development_jwt_secret_must_be_32_chars";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Core server configuration.
///
/// Constructed via [`ServerConfig::from_env`], which falls back to
/// development defaults for every variable.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (host:port).
    pub listen_addr: SocketAddr,
    /// HS256 signing secret shared by session and reset tokens.
    pub jwt_secret: String,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub pool: PoolConfig,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
    /// Reset tokens are appended to this URL as a path segment.
    pub reset_link_base_url: String,
    /// Log filter directive (e.g. `info`, `noteforge_server=debug`).
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Parse configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `NOTEFORGE_HOST` | `0.0.0.0` |
    /// | `NOTEFORGE_PORT` | `8080` |
    /// | `NOTEFORGE_JWT_SECRET` | dev-only placeholder |
    /// | `NOTEFORGE_DATABASE_URL` | *(none, in-memory store)* |
    /// | `NOTEFORGE_SESSION_TTL_HOURS` | `168` |
    /// | `NOTEFORGE_RESET_TTL_MINUTES` | `60` |
    /// | `NOTEFORGE_RESET_LINK_BASE_URL` | `http://localhost:3000/reset-password` |
    /// | `NOTEFORGE_LOG_FILTER` | `info` |
    /// | `NOTEFORGE_LOG_FORMAT` | `text` |
    pub fn from_env() -> Self {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Testable constructor that accepts an environment lookup function.
    fn from_env_fn<F>(env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = env("NOTEFORGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env("NOTEFORGE_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
        let listen_addr = format!("{host}:{port}")
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));

        let jwt_secret = env("NOTEFORGE_JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into());

        let database_url = env("NOTEFORGE_DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let session_ttl_hours = env("NOTEFORGE_SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(SESSION_TOKEN_TTL_HOURS);
        let reset_ttl_minutes = env("NOTEFORGE_RESET_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(RESET_TOKEN_TTL_MINUTES);

        let reset_link_base_url = env("NOTEFORGE_RESET_LINK_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/reset-password".into());

        let log_filter = env("NOTEFORGE_LOG_FILTER").unwrap_or_else(|_| "info".into());
        let log_format = match env("NOTEFORGE_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            listen_addr,
            jwt_secret,
            database_url,
            pool: PoolConfig::from_env_fn(&env),
            session_ttl: Duration::hours(session_ttl_hours),
            reset_ttl: Duration::minutes(reset_ttl_minutes),
            reset_link_base_url,
            log_filter,
            log_format,
        }
    }

    /// Returns true when using the development-only JWT secret.
    pub fn is_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from_map(
        map: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Result<String, std::env::VarError> {
        move |key: &str| map.get(key).map(|v| v.to_string()).ok_or(std::env::VarError::NotPresent)
    }

    #[test]
    fn defaults_when_no_env_vars() {
        let cfg = ServerConfig::from_env_fn(env_from_map(HashMap::new()));
        assert_eq!(cfg.listen_addr.port(), 8080);
        assert_eq!(cfg.listen_addr.ip().to_string(), "0.0.0.0");
        assert!(cfg.is_dev_jwt_secret());
        assert!(cfg.jwt_secret.len() >= 32);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.session_ttl, Duration::days(7));
        assert_eq!(cfg.reset_ttl, Duration::hours(1));
        assert_eq!(cfg.reset_link_base_url, "http://localhost:3000/reset-password");
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.pool, PoolConfig::default());
    }

    #[test]
    fn custom_host_and_port() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_HOST", "127.0.0.1");
        m.insert("NOTEFORGE_PORT", "3000");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert_eq!(cfg.listen_addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn invalid_port_uses_default() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_PORT", "not_a_number");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert_eq!(cfg.listen_addr.port(), 8080);
    }

    #[test]
    fn custom_jwt_secret_is_not_dev() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_JWT_SECRET", "production_secret_at_least_32_chars!!");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert!(!cfg.is_dev_jwt_secret());
    }

    #[test]
    fn blank_database_url_selects_memory_store() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_DATABASE_URL", "  ");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn token_lifetimes_are_configurable_but_must_be_positive() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_SESSION_TTL_HOURS", "12");
        m.insert("NOTEFORGE_RESET_TTL_MINUTES", "-5");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert_eq!(cfg.session_ttl, Duration::hours(12));
        assert_eq!(cfg.reset_ttl, Duration::minutes(60));
    }

    #[test]
    fn json_log_format_is_case_insensitive() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_LOG_FORMAT", "JSON");
        m.insert("NOTEFORGE_LOG_FILTER", "debug,sqlx=warn");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.log_filter, "debug,sqlx=warn");
    }

    #[test]
    fn pool_settings_flow_through() {
        let mut m = HashMap::new();
        m.insert("NOTEFORGE_DB_MAX_CONNECTIONS", "50");
        let cfg = ServerConfig::from_env_fn(env_from_map(m));
        assert_eq!(cfg.pool.max_connections, 50);
    }
}
