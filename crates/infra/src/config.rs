//! Configuration loading from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

/// Key the demo till ships with when none is configured.
pub const DEMO_ACCESS_KEY: &str = "admin123";
const DEV_SESSION_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SQLITE_URL: &str = "sqlite://quantii.db?mode=rwc";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite { url: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub access_key: String,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub seed_demo: bool,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("access_key", &"<redacted>")
            .field("session_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("bind_addr", &self.bind_addr)
            .field("store", &self.store)
            .field("seed_demo", &self.seed_demo)
            .finish()
    }
}

impl AppConfig {
    /// Read `QUANTII_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_key = var("QUANTII_ACCESS_KEY").unwrap_or_else(|| {
            tracing::warn!("QUANTII_ACCESS_KEY not set; using the demo access key");
            DEMO_ACCESS_KEY.to_string()
        });

        let session_secret = var("QUANTII_SESSION_SECRET").unwrap_or_else(|| {
            tracing::warn!("QUANTII_SESSION_SECRET not set; using insecure dev default");
            DEV_SESSION_SECRET.to_string()
        });

        let ttl_minutes = match var("QUANTII_SESSION_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(m) if m > 0 => m,
                _ => {
                    let reason = "expected a positive number of minutes";
                    return Err(invalid("QUANTII_SESSION_TTL_MINUTES", raw, reason));
                }
            },
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let bind_raw = var("QUANTII_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid("QUANTII_BIND_ADDR", bind_raw.clone(), e.to_string()))?;

        let store = match var("QUANTII_STORE").map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("sqlite") => StoreBackend::Sqlite {
                url: var("QUANTII_DATABASE_URL").unwrap_or_else(|| DEFAULT_SQLITE_URL.to_string()),
            },
            Some(other) => {
                let reason = "expected 'memory' or 'sqlite'";
                return Err(invalid("QUANTII_STORE", other.to_string(), reason));
            }
        };

        let seed_demo = match var("QUANTII_SEED_DEMO") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| invalid("QUANTII_SEED_DEMO", raw, "expected true or false"))?,
            None => true,
        };

        Ok(Self {
            access_key,
            session_secret,
            session_ttl: Duration::minutes(ttl_minutes),
            bind_addr,
            store,
            seed_demo,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { var, value, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_suit_a_local_demo() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.access_key, DEMO_ACCESS_KEY);
        assert_eq!(cfg.store, StoreBackend::Memory);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.session_ttl, Duration::minutes(480));
        assert!(cfg.seed_demo);
    }

    #[test]
    fn sqlite_backend_uses_database_url() {
        let cfg = load(&[
            ("QUANTII_STORE", "SQLite"),
            ("QUANTII_DATABASE_URL", "sqlite://till.db?mode=rwc"),
            ("QUANTII_SEED_DEMO", "no"),
            ("QUANTII_ACCESS_KEY", "letmein"),
        ])
        .unwrap();

        assert_eq!(cfg.store, StoreBackend::Sqlite { url: "sqlite://till.db?mode=rwc".into() });
        assert!(!cfg.seed_demo);
        assert_eq!(cfg.access_key, "letmein");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = load(&[("QUANTII_ACCESS_KEY", "  ")]).unwrap();
        assert_eq!(cfg.access_key, DEMO_ACCESS_KEY);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("QUANTII_STORE", "firestore")]),
            Err(ConfigError::Invalid { var: "QUANTII_STORE", .. })
        ));
        assert!(load(&[("QUANTII_BIND_ADDR", "nowhere")]).is_err());
        assert!(load(&[("QUANTII_SESSION_TTL_MINUTES", "0")]).is_err());
        assert!(load(&[("QUANTII_SEED_DEMO", "maybe")]).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = load(&[("QUANTII_ACCESS_KEY", "hunter2")]).unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
