//! Configuration module for Mailroom.

use serde::Deserialize;
use std::path::Path;

use crate::{MailroomError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in megabytes (profile pictures travel inline).
    #[serde(default = "default_max_body_size")]
    pub max_body_size_mb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_size() -> usize {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            max_body_size_mb: default_max_body_size(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/mailroom.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key (required).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// Rate limit for the login endpoint (requests per minute per client).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_token_expiry() -> u64 {
    3600 // 1 hour
}

fn default_login_rate_limit() -> u32 {
    5
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Transport security for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS from the first byte (usually port 465).
    Tls,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    #[default]
    Starttls,
    /// No encryption. Only for local relays.
    None,
}

/// Outbound SMTP configuration.
///
/// Built once at startup and handed to the delivery transport.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Whether messages are handed to an SMTP relay. When false, sends are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// Relay host name.
    #[serde(default)]
    pub host: String,
    /// Relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Login user name. Empty disables authentication.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Connection security.
    #[serde(default)]
    pub security: SmtpSecurity,
    /// Timeout for one delivery attempt in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    30
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            security: SmtpSecurity::default(),
            timeout_secs: default_smtp_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mailroom.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outbound SMTP configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MailroomError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| MailroomError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MAILROOM_JWT_SECRET`
    /// - `MAILROOM_SMTP_HOST`
    /// - `MAILROOM_SMTP_USERNAME`
    /// - `MAILROOM_SMTP_PASSWORD`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("MAILROOM_JWT_SECRET", &mut self.auth.jwt_secret),
            ("MAILROOM_SMTP_HOST", &mut self.smtp.host),
            ("MAILROOM_SMTP_USERNAME", &mut self.smtp.username),
            ("MAILROOM_SMTP_PASSWORD", &mut self.smtp.password),
        ];

        for (var, target) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *target = value;
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is not set
    /// - SMTP is enabled without a host
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(MailroomError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via MAILROOM_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.smtp.enabled && self.smtp.host.is_empty() {
            return Err(MailroomError::Config(
                "SMTP is enabled but smtp.host is not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.max_body_size_mb, 10);

        assert_eq!(config.database.path, "data/mailroom.db");

        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.token_expiry_secs, 3600);
        assert_eq!(config.auth.login_rate_limit, 5);

        assert!(!config.smtp.enabled);
        assert!(config.smtp.host.is_empty());
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.security, SmtpSecurity::Starttls);
        assert_eq!(config.smtp.timeout_secs, 30);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/mailroom.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
cors_origins = ["http://localhost:3000", "http://localhost:5173"]
max_body_size_mb = 20

[database]
path = "custom/mail.sqlite"

[auth]
jwt_secret = "test-secret-key"
token_expiry_secs = 600
login_rate_limit = 10

[smtp]
enabled = true
host = "smtp.example.com"
port = 465
username = "mailer"
password = "hunter22"
security = "tls"
timeout_secs = 10

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.server.cors_origins[1], "http://localhost:5173");
        assert_eq!(config.server.max_body_size_mb, 20);

        assert_eq!(config.database.path, "custom/mail.sqlite");

        assert_eq!(config.auth.jwt_secret, "test-secret-key");
        assert_eq!(config.auth.token_expiry_secs, 600);
        assert_eq!(config.auth.login_rate_limit, 10);

        assert!(config.smtp.enabled);
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.username, "mailer");
        assert_eq!(config.smtp.password, "hunter22");
        assert_eq!(config.smtp.security, SmtpSecurity::Tls);
        assert_eq!(config.smtp.timeout_secs, 10);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 9000

[smtp]
security = "none"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.smtp.security, SmtpSecurity::None);

        // Defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.database.path, "data/mailroom.db");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/mailroom.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(MailroomError::Validation(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_parse_unknown_security_mode() {
        let result = Config::parse("[smtp]\nsecurity = \"ssl3\"\n");
        assert!(matches!(result, Err(MailroomError::Validation(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(MailroomError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth]\njwt_secret = \"from-file\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.auth.jwt_secret, "from-file");
    }

    #[test]
    fn test_apply_env_overrides_jwt_secret() {
        let original = std::env::var("MAILROOM_JWT_SECRET").ok();

        std::env::set_var("MAILROOM_JWT_SECRET", "env-secret-key");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.auth.jwt_secret, "env-secret-key");

        // Empty values do not override
        std::env::set_var("MAILROOM_JWT_SECRET", "");
        let mut config = Config::default();
        config.auth.jwt_secret = "original-secret".to_string();
        config.apply_env_overrides();
        assert_eq!(config.auth.jwt_secret, "original-secret");

        if let Some(val) = original {
            std::env::set_var("MAILROOM_JWT_SECRET", val);
        } else {
            std::env::remove_var("MAILROOM_JWT_SECRET");
        }
    }

    #[test]
    fn test_apply_env_overrides_smtp_password() {
        let original = std::env::var("MAILROOM_SMTP_PASSWORD").ok();

        std::env::set_var("MAILROOM_SMTP_PASSWORD", "env-smtp-pass");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.smtp.password, "env-smtp-pass");

        if let Some(val) = original {
            std::env::set_var("MAILROOM_SMTP_PASSWORD", val);
        } else {
            std::env::remove_var("MAILROOM_SMTP_PASSWORD");
        }
    }

    #[test]
    fn test_validate_missing_secret() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(MailroomError::Config(msg)) = result {
            assert!(msg.contains("jwt_secret"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_smtp_enabled_without_host() {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();
        config.smtp.enabled = true;

        let result = config.validate();
        assert!(matches!(result, Err(MailroomError::Config(msg)) if msg.contains("smtp.host")));
    }

    #[test]
    fn test_validate_ok() {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();

        assert!(config.validate().is_ok());

        config.smtp.enabled = true;
        config.smtp.host = "localhost".to_string();
        assert!(config.validate().is_ok());
    }
}
