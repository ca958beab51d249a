use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::{CacheConfig, ScoringConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub certification: CertificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let certification = CertificationConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            certification,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" | "" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Scoring thresholds, catalog source, and result cache sizing.
#[derive(Debug, Clone, Default)]
pub struct CertificationConfig {
    pub scoring: ScoringConfig,
    pub catalog_path: Option<PathBuf>,
    pub cache: CacheConfig,
}

impl CertificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let scoring = ScoringConfig {
            gold_threshold: threshold_from_env(
                "CERT_GOLD_THRESHOLD",
                defaults.scoring.gold_threshold,
            )?,
            certified_threshold: threshold_from_env(
                "CERT_CERTIFIED_THRESHOLD",
                defaults.scoring.certified_threshold,
            )?,
            improvement_threshold: threshold_from_env(
                "CERT_IMPROVEMENT_THRESHOLD",
                defaults.scoring.improvement_threshold,
            )?,
        };

        if scoring.gold_threshold < scoring.certified_threshold {
            return Err(ConfigError::ThresholdOrder {
                gold: scoring.gold_threshold,
                certified: scoring.certified_threshold,
            });
        }

        let catalog_path = env::var("CERT_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let cache = CacheConfig {
            ttl_seconds: cache_setting_from_env("CERT_CACHE_TTL_SECS", defaults.cache.ttl_seconds)?,
            capacity: cache_setting_from_env("CERT_CACHE_CAPACITY", defaults.cache.capacity as u64)?
                as usize,
        };

        Ok(Self {
            scoring,
            catalog_path,
            cache,
        })
    }
}

fn threshold_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=100.0).contains(&value) => Ok(value),
        _ => Err(ConfigError::InvalidThreshold { name, value: raw }),
    }
}

fn cache_setting_from_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidCacheSetting { name, value: raw })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidThreshold { name: &'static str, value: String },
    ThresholdOrder { gold: f64, certified: f64 },
    InvalidCacheSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "{name} must be a number between 0 and 100 (found '{value}')")
            }
            ConfigError::ThresholdOrder { gold, certified } => write!(
                f,
                "CERT_GOLD_THRESHOLD ({gold}) must not be below CERT_CERTIFIED_THRESHOLD ({certified})"
            ),
            ConfigError::InvalidCacheSetting { name, value } => {
                write!(f, "{name} must be a non-negative integer (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "CERT_GOLD_THRESHOLD",
            "CERT_CERTIFIED_THRESHOLD",
            "CERT_IMPROVEMENT_THRESHOLD",
            "CERT_CATALOG_PATH",
            "CERT_CACHE_TTL_SECS",
            "CERT_CACHE_CAPACITY",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.certification.scoring, ScoringConfig::default());
        assert!(config.certification.catalog_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_certification_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CERT_GOLD_THRESHOLD", "85");
        env::set_var("CERT_CERTIFIED_THRESHOLD", "65.5");
        env::set_var("CERT_CATALOG_PATH", "/etc/cert/indicators.csv");
        env::set_var("CERT_CACHE_TTL_SECS", "30");
        env::set_var("APP_LOG_FORMAT", "json");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.certification.scoring.gold_threshold, 85.0);
        assert_eq!(config.certification.scoring.certified_threshold, 65.5);
        assert_eq!(
            config.certification.catalog_path,
            Some(PathBuf::from("/etc/cert/indicators.csv"))
        );
        assert_eq!(config.certification.cache.ttl_seconds, 30);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_and_inverted_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CERT_GOLD_THRESHOLD", "120");
        match AppConfig::load() {
            Err(ConfigError::InvalidThreshold { name, .. }) => {
                assert_eq!(name, "CERT_GOLD_THRESHOLD")
            }
            other => panic!("expected invalid threshold, got {other:?}"),
        }

        env::set_var("CERT_GOLD_THRESHOLD", "50");
        match AppConfig::load() {
            Err(ConfigError::ThresholdOrder { .. }) => {}
            other => panic!("expected threshold order error, got {other:?}"),
        }
        reset_env();
    }
}
