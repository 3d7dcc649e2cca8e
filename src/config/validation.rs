//! Configuration validation module

use crate::config::{Config, GitConfig, ScannerConfig, ServerConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Git configuration error: {message}")]
    Git { message: String },

    #[error("Scanner configuration error: {message}")]
    Scanner { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn git(message: impl Into<String>) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    pub fn scanner(message: impl Into<String>) -> Self {
        Self::Scanner {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // Note: u16 cannot exceed 65535, so we only need to check for 0
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty".to_string()));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.scan_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Scan timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for GitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.fetch_timeout_seconds == 0 {
            return Err(ValidationError::git(
                "Fetch timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for ScannerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.executable.is_empty() {
            return Err(ValidationError::scanner(
                "Scanner executable cannot be empty".to_string(),
            ));
        }

        if self.report_filename.is_empty() {
            return Err(ValidationError::scanner(
                "Report filename cannot be empty".to_string(),
            ));
        }

        // The report path is joined onto the workspace root; a separator here
        // would let the artifact escape the workspace.
        if self.report_filename.contains(std::path::MAIN_SEPARATOR) {
            return Err(ValidationError::scanner(format!(
                "Report filename must not contain path separators, got {}",
                self.report_filename
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::scanner(
                "Scanner timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.git.validate()?;
        self.scanner.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_validation() {
        let valid = ServerConfig::default();
        assert!(valid.validate().is_ok());

        // Invalid port (0)
        let invalid = ServerConfig {
            port: 0,
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        // Invalid timeout (0)
        let invalid = ServerConfig {
            request_timeout_seconds: 0,
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        // Invalid host (empty)
        let invalid = ServerConfig {
            host: String::new(),
            ..valid
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_git_config_validation() {
        let valid = GitConfig::default();
        assert!(valid.validate().is_ok());

        let invalid = GitConfig {
            fetch_timeout_seconds: 0,
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_scanner_config_validation() {
        let valid = ScannerConfig::default();
        assert!(valid.validate().is_ok());

        // Empty executable
        let invalid = ScannerConfig {
            executable: String::new(),
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        // Report filename escaping the workspace
        let invalid = ScannerConfig {
            report_filename: "../report.json".to_string(),
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        // Invalid timeout
        let invalid = ScannerConfig {
            timeout_seconds: 0,
            ..valid
        };
        assert!(invalid.validate().is_err());
    }
}
