use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Breach provider (HIBP) configuration
    pub hibp: HibpConfig,
    /// Alert email configuration
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HibpConfig {
    /// API key sent in the `hibp-api-key` header. May be empty; lookups then
    /// fail with a configuration error instead of stopping the process.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_hibp_base_url")]
    pub base_url: String,

    #[serde(default = "default_hibp_api_version")]
    pub api_version: String,

    #[serde(default = "default_hibp_user_agent")]
    pub user_agent: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_hibp_timeout_ms")]
    pub timeout_ms: u64,

    /// Ask the provider for truncated breach entries (names only).
    /// Must stay false: stored breaches need the full entry.
    #[serde(default)]
    pub truncate_response: bool,

    /// Pause between two monitored addresses during a breach check
    #[serde(default = "default_rate_limit_wait")]
    pub rate_limit_wait_secs: u64,
}

impl Default for HibpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_hibp_base_url(),
            api_version: default_hibp_api_version(),
            user_agent: default_hibp_user_agent(),
            timeout_ms: default_hibp_timeout_ms(),
            truncate_response: false,
            rate_limit_wait_secs: default_rate_limit_wait(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// How long shutdown waits for a running breach check to finish
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_hibp_base_url() -> String {
    "https://haveibeenpwned.com/api".to_string()
}
fn default_hibp_api_version() -> String {
    "v3".to_string()
}
fn default_hibp_user_agent() -> String {
    format!("breachwatch/{}", env!("CARGO_PKG_VERSION"))
}
fn default_hibp_timeout_ms() -> u64 {
    10_000
}
fn default_rate_limit_wait() -> u64 {
    120
}
fn default_shutdown_timeout() -> u64 {
    30
}

/// Email service configuration for breach alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email sending is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: smtp or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// Use STARTTLS (default: true)
    #[serde(default = "default_smtp_tls")]
    pub smtp_use_tls: bool,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Send every alert to this address instead of the breached one
    #[serde(default)]
    pub alert_recipient: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_use_tls: default_smtp_tls(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            alert_recipient: String::new(),
        }
    }
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_sender_email() -> String {
    "alerts@breachwatch.local".to_string()
}

fn default_sender_name() -> String {
    "Breach Watch".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with BW__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("BW").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [hibp]
            api_key = ""
            base_url = "https://haveibeenpwned.com/api"
            api_version = "v3"
            timeout_ms = 10000
            truncate_response = false
            rate_limit_wait_secs = 120

            [email]
            enabled = false
            provider = "console"
            sender_email = "test@example.com"
            sender_name = "Test"

            [scheduler]
            shutdown_timeout_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "BW__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.hibp.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "hibp.base_url cannot be empty".to_string(),
            ));
        }

        if self.hibp.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "hibp.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.hibp.truncate_response {
            return Err(ConfigValidationError::InvalidValue(
                "hibp.truncate_response must be false: truncated entries lack the breach dates needed to store breaches".to_string(),
            ));
        }

        if !matches!(self.email.provider.as_str(), "console" | "smtp") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Unknown email provider '{}' (expected console or smtp)",
                self.email.provider
            )));
        }

        if self.email.enabled && self.email.provider == "smtp" && self.email.smtp_host.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "email.smtp_host is required when the smtp provider is enabled".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
