//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Base URL of the external identity service (e.g. https://auth.example.com/auth/v1).
    pub auth_base_url: String,

    /// Service API key sent to the identity service.
    pub auth_api_key: String,

    /// HS256 secret used to verify access tokens minted by the identity service.
    pub auth_jwt_secret: String,

    /// Shared secret for the cache revalidation endpoint. When None, the
    /// endpoint accepts unauthenticated calls (dev setups).
    pub revalidate_secret: Option<String>,

    /// Base URL of the external machine-translation service.
    pub translate_api_url: String,

    /// Optional API key for the translation service.
    pub translate_api_key: Option<String>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Default site language (default: "fr").
    pub default_language: String,

    /// Known site languages (comma-separated, default: "fr,en").
    pub languages: Vec<String>,

    /// SMTP host for email delivery. When None, email is disabled.
    pub smtp_host: Option<String>,

    /// SMTP port (default: 587).
    pub smtp_port: u16,

    /// SMTP username for authentication.
    pub smtp_username: Option<String>,

    /// SMTP password for authentication.
    pub smtp_password: Option<String>,

    /// SMTP encryption mode: "starttls" (default), "tls", or "none".
    pub smtp_encryption: String,

    /// From address for outgoing email.
    pub smtp_from_email: String,

    /// Staff mailbox receiving contact and sample notifications.
    pub contact_recipient: Option<String>,

    /// Public site URL for constructing links in notification emails.
    pub site_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let auth_base_url = env::var("AUTH_BASE_URL")
            .context("AUTH_BASE_URL environment variable is required")?
            .trim_end_matches('/')
            .to_string();

        let auth_api_key =
            env::var("AUTH_API_KEY").context("AUTH_API_KEY environment variable is required")?;

        let auth_jwt_secret = env::var("AUTH_JWT_SECRET")
            .context("AUTH_JWT_SECRET environment variable is required")?;
        if auth_jwt_secret.len() < 32 {
            anyhow::bail!("AUTH_JWT_SECRET must be at least 32 bytes");
        }

        let revalidate_secret = env::var("REVALIDATE_SECRET").ok().filter(|s| !s.is_empty());

        let translate_api_url = env::var("TRANSLATE_API_URL")
            .unwrap_or_else(|_| "https://libretranslate.com/translate".to_string());

        let translate_api_key = env::var("TRANSLATE_API_KEY").ok().filter(|s| !s.is_empty());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let default_language = env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "fr".to_string());

        let languages: Vec<String> = env::var("LANGUAGES")
            .unwrap_or_else(|_| "fr,en".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if !languages.contains(&default_language) {
            anyhow::bail!(
                "DEFAULT_LANGUAGE '{default_language}' must be one of LANGUAGES ({languages:?})"
            );
        }

        let smtp_host = env::var("SMTP_HOST").ok();

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .context("SMTP_PORT must be a valid u16")?;

        let smtp_username = env::var("SMTP_USERNAME").ok();
        let smtp_password = env::var("SMTP_PASSWORD").ok();

        let smtp_encryption = env::var("SMTP_ENCRYPTION")
            .unwrap_or_else(|_| "starttls".to_string())
            .to_lowercase();

        let smtp_from_email =
            env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| "noreply@localhost".to_string());

        let contact_recipient = env::var("CONTACT_EMAIL").ok().filter(|s| !s.is_empty());

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            auth_base_url,
            auth_api_key,
            auth_jwt_secret,
            revalidate_secret,
            translate_api_url,
            translate_api_key,
            cors_allowed_origins,
            default_language,
            languages,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_encryption,
            smtp_from_email,
            contact_recipient,
            site_url,
        })
    }
}
