/// Configuration management for the API server
///
/// Loaded from environment variables (a `.env` file is honored in
/// development).
///
/// # Environment Variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | `DATABASE_URL` | required | `memory://` selects the in-memory store |
/// | `DATABASE_MAX_CONNECTIONS` | 10 | |
/// | `API_HOST` / `API_PORT` | 0.0.0.0 / 8080 | |
/// | `API_PRODUCTION` | false | enables HSTS |
/// | `CORS_ORIGINS` | `*` | comma separated |
/// | `PUBLIC_URL` | `http://localhost:8080` | base of invite links |
/// | `SECRET_KEY` | required | token signing key and password pepper, ≥ 32 chars |
/// | `JWT_EXPIRATION_SECONDS` | 300 | |
/// | `JWT_NOT_BEFORE_SECONDS` | 0 | |
/// | `NOTIFY_MODE` | direct | `direct` or `queue` |
/// | `SMTP_HOST` / `SMTP_PORT` | localhost / 25 | direct mode |
/// | `SMTP_USERNAME` / `SMTP_PASSWORD` | unset | direct mode |
/// | `MAIL_FROM` | `Tasklane <no-reply@localhost>` | |
/// | `REDIS_URL` | required in queue mode | |
/// | `NOTIFY_QUEUE_NAME` | `tasklane:emails` | |
/// | `LOG_FORMAT` | text | `json` for structured logs |
///
/// # Example
///
/// ```no_run
/// use tasklane_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::{anyhow, bail, Context};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tasklane_shared::auth::jwt::TokenSettings;
use tasklane_shared::notify::mail::SmtpConfig;

/// Scheme that selects the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub notify: NotifyConfig,

    /// Emit JSON log lines
    pub log_json: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production deployments get HSTS
    pub production: bool,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Externally reachable base URL
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// Token and password settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signs tokens and peppers password hashes. Keep it secret.
    pub secret_key: String,

    pub token_expiration_seconds: i64,

    pub token_not_before_seconds: i64,
}

impl AuthConfig {
    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            expiration: Duration::seconds(self.token_expiration_seconds),
            not_before: Duration::seconds(self.token_not_before_seconds),
        }
    }
}

/// How emails leave the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Send over SMTP from the request; failures are logged
    Direct,

    /// Push onto a Redis list for a mail worker
    Queue,
}

impl FromStr for NotifyMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(NotifyMode::Direct),
            "queue" => Ok(NotifyMode::Queue),
            other => Err(anyhow!("NOTIFY_MODE must be 'direct' or 'queue', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub mode: NotifyMode,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,

    #[serde(skip_serializing)]
    pub smtp_password: Option<String>,

    pub mail_from: String,
    pub redis_url: Option<String>,
    pub queue_name: String,
}

impl NotifyConfig {
    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            from: self.mail_from.clone(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow!("{} environment variable is required", key))
        };

        let secret_key = required("SECRET_KEY")?;
        if secret_key.len() < 32 {
            bail!("SECRET_KEY must be at least 32 characters long");
        }

        let mode: NotifyMode = var("NOTIFY_MODE", "direct").parse()?;
        let redis_url = lookup("REDIS_URL");
        if mode == NotifyMode::Queue && redis_url.is_none() {
            bail!("REDIS_URL is required when NOTIFY_MODE=queue");
        }

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: parse(&var("API_PORT", "8080"), "API_PORT")?,
                production: parse(&var("API_PRODUCTION", "false"), "API_PRODUCTION")?,
                cors_origins,
                public_url: var("PUBLIC_URL", "http://localhost:8080")
                    .trim_end_matches('/')
                    .to_string(),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse(
                    &var("DATABASE_MAX_CONNECTIONS", "10"),
                    "DATABASE_MAX_CONNECTIONS",
                )?,
            },
            auth: AuthConfig {
                secret_key,
                token_expiration_seconds: parse(
                    &var("JWT_EXPIRATION_SECONDS", "300"),
                    "JWT_EXPIRATION_SECONDS",
                )?,
                token_not_before_seconds: parse(
                    &var("JWT_NOT_BEFORE_SECONDS", "0"),
                    "JWT_NOT_BEFORE_SECONDS",
                )?,
            },
            notify: NotifyConfig {
                mode,
                smtp_host: var("SMTP_HOST", "localhost"),
                smtp_port: parse(&var("SMTP_PORT", "25"), "SMTP_PORT")?,
                smtp_username: lookup("SMTP_USERNAME"),
                smtp_password: lookup("SMTP_PASSWORD"),
                mail_from: var("MAIL_FROM", "Tasklane <no-reply@localhost>"),
                redis_url,
                queue_name: var("NOTIFY_QUEUE_NAME", "tasklane:emails"),
            },
            log_json: var("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse<T>(value: &str, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("{} has an invalid value: '{}'", key, value))
}
