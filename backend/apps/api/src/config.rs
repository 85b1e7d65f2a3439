//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

/// Process configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL (`DATABASE_URL`); `None` selects the in-memory store
    pub database_url: Option<String>,
    /// Pool size (`DATABASE_MAX_CONNECTIONS`)
    pub database_max_connections: u32,
    /// Mark the session cookie `Secure` (`SESSION_COOKIE_SECURE`)
    pub session_cookie_secure: bool,
    /// Expired-session purge period (`SESSION_CLEANUP_INTERVAL_SECS`)
    pub session_cleanup_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; invalid values are errors, absent ones
    /// take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let cleanup_secs: u64 = parse_or(&lookup, "SESSION_CLEANUP_INTERVAL_SECS", 300)?;
        if cleanup_secs == 0 {
            bail!("SESSION_CLEANUP_INTERVAL_SECS must be greater than 0");
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            session_cookie_secure: parse_or(&lookup, "SESSION_COOKIE_SECURE", false)?,
            session_cleanup_interval: Duration::from_secs(cleanup_secs),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert!(!config.session_cookie_secure);
        assert_eq!(config.session_cleanup_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("SESSION_COOKIE_SECURE", "true"),
            ("SESSION_CLEANUP_INTERVAL_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/app")
        );
        assert_eq!(config.database_max_connections, 20);
        assert!(config.session_cookie_secure);
        assert_eq!(config.session_cleanup_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config(&[("BIND_ADDR", "nope")]).is_err());
        assert!(config(&[("DATABASE_MAX_CONNECTIONS", "-1")]).is_err());
        assert!(config(&[("SESSION_COOKIE_SECURE", "yes")]).is_err());
        assert!(config(&[("SESSION_CLEANUP_INTERVAL_SECS", "0")]).is_err());
    }
}
