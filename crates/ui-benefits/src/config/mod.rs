use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub rules: RulesConfig,
    pub retrieval: RetrievalConfig,
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

        let dataset_path = env::var("APP_RULES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let match_count = match env::var("APP_RETRIEVAL_MATCH_COUNT") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or(ConfigError::InvalidMatchCount)?,
            Err(_) => RetrievalConfig::DEFAULT_MATCH_COUNT,
        };
        let match_threshold = match env::var("APP_RETRIEVAL_MATCH_THRESHOLD") {
            Ok(value) => value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|threshold| (0.0..=1.0).contains(threshold))
                .ok_or(ConfigError::InvalidMatchThreshold)?,
            Err(_) => RetrievalConfig::DEFAULT_MATCH_THRESHOLD,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            rules: RulesConfig { dataset_path },
            retrieval: RetrievalConfig {
                match_count,
                match_threshold,
            },
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
}

/// Where state rules come from. `None` means the dataset compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    pub dataset_path: Option<PathBuf>,
}

/// Handbook retrieval settings for full qualitative assessments.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub match_count: usize,
    pub match_threshold: f32,
}

impl RetrievalConfig {
    pub const DEFAULT_MATCH_COUNT: usize = 5;
    pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.65;
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            match_count: Self::DEFAULT_MATCH_COUNT,
            match_threshold: Self::DEFAULT_MATCH_THRESHOLD,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMatchCount,
    InvalidMatchThreshold,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMatchCount => {
                write!(f, "APP_RETRIEVAL_MATCH_COUNT must be a positive integer")
            }
            ConfigError::InvalidMatchThreshold => {
                write!(f, "APP_RETRIEVAL_MATCH_THRESHOLD must be a number between 0 and 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMatchCount
            | ConfigError::InvalidMatchThreshold => None,
        }
    }
}
