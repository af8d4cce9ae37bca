//! Bot configuration
//!
//! Settings are read from `BOT_`-prefixed environment variables (a `.env`
//! file is loaded by the binary first). The token and the operator id are
//! required; everything else has a default.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use core_kernel::UserId;

/// Prefix shared by every setting
pub const ENV_PREFIX: &str = "BOT";

const DEFAULT_DATABASE_URL: &str = "sqlite://database.db?mode=rwc";
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROGRESS_DELAY_MS: u64 = 1200;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting BOT_{0}")]
    Missing(&'static str),

    #[error("invalid value for BOT_{key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Bot configuration
#[derive(Clone)]
pub struct BotConfig {
    /// Bot API token
    pub token: String,
    /// Operator receiving notifications and allowed to use `/admin`
    pub admin_id: UserId,
    /// SQLite connection string
    pub database_url: String,
    /// Bot API base URL
    pub api_url: String,
    /// Long-poll timeout for `getUpdates`
    pub poll_timeout: Duration,
    /// Delay between progress edits
    pub progress_delay: Duration,
    /// Address of the health endpoint, disabled when `None`
    pub health_addr: Option<SocketAddr>,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

/// Settings as they arrive from the environment, before validation
#[derive(Debug, Default, Deserialize)]
struct RawBotConfig {
    token: Option<String>,
    admin_id: Option<String>,
    database_url: Option<String>,
    api_url: Option<String>,
    poll_timeout_secs: Option<String>,
    progress_delay_ms: Option<String>,
    health_addr: Option<String>,
    log_level: Option<String>,
    log_json: Option<String>,
}

impl BotConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Self::from_config(source)
    }

    /// Validates an already-built configuration source
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let raw: RawBotConfig = source.try_deserialize()?;
        raw.validate()
    }
}

impl RawBotConfig {
    fn validate(self) -> Result<BotConfig, ConfigError> {
        let token = required(self.token, "TOKEN")?;
        let admin_id = required(self.admin_id, "ADMIN_ID")?;
        let admin_id = admin_id
            .trim()
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|e| invalid("ADMIN_ID", e))?;

        let api_url = optional(self.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let poll_timeout = match optional(self.poll_timeout_secs) {
            Some(v) => Duration::from_secs(v.trim().parse().map_err(|e| invalid("POLL_TIMEOUT_SECS", e))?),
            None => Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        };

        let progress_delay = match optional(self.progress_delay_ms) {
            Some(v) => Duration::from_millis(v.trim().parse().map_err(|e| invalid("PROGRESS_DELAY_MS", e))?),
            None => Duration::from_millis(DEFAULT_PROGRESS_DELAY_MS),
        };

        let health_addr = optional(self.health_addr)
            .map(|v| v.trim().parse::<SocketAddr>())
            .transpose()
            .map_err(|e| invalid("HEALTH_ADDR", e))?;

        let log_json = match optional(self.log_json) {
            Some(v) => parse_flag(&v).ok_or_else(|| invalid("LOG_JSON", format!("expected true or false, got '{v}'")))?,
            None => false,
        };

        Ok(BotConfig {
            token,
            admin_id,
            database_url: optional(self.database_url).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            api_url,
            poll_timeout,
            progress_delay,
            health_addr,
            log_level: optional(self.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_json,
        })
    }
}

/// Blank values count as absent
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    optional(value).ok_or(ConfigError::Missing(key))
}

fn invalid(key: &'static str, err: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        message: err.to_string(),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("admin_id", &self.admin_id)
            .field("database_url", &self.database_url)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("progress_delay", &self.progress_delay)
            .field("health_addr", &self.health_addr)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        BotConfig::from_config(builder.build().unwrap())
    }

    #[test]
    fn test_defaults_apply() {
        let config = load(&[("token", "123:abc"), ("admin_id", "7355988800")]).unwrap();

        assert_eq!(config.token, "123:abc");
        assert_eq!(config.admin_id, UserId::new(7_355_988_800));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.progress_delay, Duration::from_millis(1200));
        assert!(config.health_addr.is_none());
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = load(&[("admin_id", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TOKEN")));
        assert_eq!(err.to_string(), "missing required setting BOT_TOKEN");
    }

    #[test]
    fn test_blank_admin_counts_as_missing() {
        let err = load(&[("token", "t"), ("admin_id", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADMIN_ID")));
    }

    #[test]
    fn test_malformed_admin_is_invalid() {
        let err = load(&[("token", "t"), ("admin_id", "not-a-number")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ADMIN_ID", .. }));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("token", "t"),
            ("admin_id", "42"),
            ("api_url", "http://127.0.0.1:9000/"),
            ("poll_timeout_secs", "5"),
            ("progress_delay_ms", "0"),
            ("health_addr", "127.0.0.1:8080"),
            ("log_json", "true"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.poll_timeout, Duration::from_secs(5));
        assert_eq!(config.progress_delay, Duration::ZERO);
        assert_eq!(config.health_addr, Some("127.0.0.1:8080".parse().unwrap()));
        assert!(config.log_json);
    }

    #[test]
    fn test_bad_health_addr() {
        let err = load(&[("token", "t"), ("admin_id", "1"), ("health_addr", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HEALTH_ADDR", .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("token", "secret-token"), ("admin_id", "1")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
