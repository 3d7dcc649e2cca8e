//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub git: GitConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose interactive API docs (Swagger UI). Should be false in hardened production.
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Per-route timeout for scan requests (in seconds). Must exceed the
    /// combined fetch and scanner timeouts so the pipeline, not the transport,
    /// decides the outcome.
    pub scan_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only).
    pub allowed_origins: Vec<String>,
    /// Grace period granted to in-flight requests during shutdown.
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_docs: true,
            request_timeout_seconds: 30,
            scan_timeout_seconds: 360,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            shutdown_timeout_seconds: 5,
        }
    }
}

/// Scan workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Optional parent directory for scan workspaces. Defaults to the system temp dir.
    pub parent_dir: Option<PathBuf>,
}

/// Git fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Timeout applied to network fetches (passed down to libgit2), in seconds.
    pub fetch_timeout_seconds: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: 30,
        }
    }
}

impl GitConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

/// External scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Path to the gitleaks executable (or "gitleaks" if in PATH).
    pub executable: String,
    /// Name of the report file the scanner writes inside the workspace.
    pub report_filename: String,
    /// Scanner execution timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            executable: "gitleaks".to_string(),
            report_filename: "gitleaks-report.json".to_string(),
            timeout_seconds: 300,
        }
    }
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("LEAKSWEEP").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://localhost:3000".to_string()]
        );
        assert_eq!(config.git.fetch_timeout_seconds, 30);
        assert_eq!(config.scanner.executable, "gitleaks");
        assert_eq!(config.scanner.report_filename, "gitleaks-report.json");
        assert_eq!(config.scanner.timeout_seconds, 300);
        assert!(config.workspace.parent_dir.is_none());
    }

    #[test]
    fn test_default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_duration_helpers_convert_seconds() {
        let config = Config::default();
        assert_eq!(config.git.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.scanner.timeout(), Duration::from_secs(300));
    }
}
