use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Environment variable prefix, e.g. `GLOWUP__DATABASE__URL`.
pub const ENV_PREFIX: &str = "GLOWUP";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub admin: SeedAdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; `*` allows any origin.
    pub cors_origin: String,
    /// Timeout applied to outbound calls to the storage and mail providers.
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: SecretString,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: SecretString,
    #[serde(default = "default_jwt_expiration_days")]
    pub expiration_days: i64,
}

/// Credentials for the Cloudinary-compatible image host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: SecretString,
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
}

/// Credentials for the Brevo-compatible transactional email API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(skip_serializing)]
    pub api_key: SecretString,
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Mailbox receiving new-participation alerts.
    pub admin_email: String,
    #[serde(default = "default_mail_base_url")]
    pub base_url: String,
}

/// The administrator ensured at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedAdminConfig {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: SecretString,
    #[serde(default)]
    pub force_password_reset: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_jwt_expiration_days() -> i64 {
    7
}

fn default_storage_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_from_name() -> String {
    "Bambou Glow Up".to_string()
}

fn default_mail_base_url() -> String {
    "https://api.brevo.com/v3".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origin: "*".to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Fails when a required setting is absent or blank, so the process
    /// stops before binding a port.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(Self::environment())
    }

    /// Builds the configuration from an explicit environment source.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(environment)
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment source using `GLOWUP` prefix and `__` separator
    /// e.g., GLOWUP__DATABASE__URL="postgres://..."
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }

    /// Rejects blank required values that deserialized successfully.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let required: [(&str, &str); 10] = [
            ("database.url", self.database.url.expose_secret()),
            ("jwt.secret", self.jwt.secret.expose_secret()),
            ("storage.cloud_name", &self.storage.cloud_name),
            ("storage.api_key", &self.storage.api_key),
            ("storage.api_secret", self.storage.api_secret.expose_secret()),
            ("mail.api_key", self.mail.api_key.expose_secret()),
            ("mail.from_email", &self.mail.from_email),
            ("mail.admin_email", &self.mail.admin_email),
            ("admin.email", &self.admin.email),
            ("admin.password", self.admin.password.expose_secret()),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!(
                    "{} must not be empty",
                    key
                )));
            }
        }

        for (key, value) in [
            ("storage.base_url", &self.storage.base_url),
            ("mail.base_url", &self.mail.base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                config::ConfigError::Message(format!("{} is not a valid URL: {}", key, e))
            })?;
        }

        if self.jwt.expiration_days <= 0 {
            return Err(config::ConfigError::Message(
                "jwt.expiration_days must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets are skipped during serialization
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
