//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::cache::PageCache;
use crate::config::Config;
use crate::db;
use crate::middleware::language::{
    AcceptLanguageNegotiator, CookieNegotiator, LanguageNegotiator,
};
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::services::auth::AuthClient;
use crate::services::email::EmailService;
use crate::services::translate::TranslateClient;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Loaded configuration.
    config: Config,

    /// Identity service client.
    auth: AuthClient,

    /// Machine-translation service client.
    translate: TranslateClient,

    /// Email delivery service (available when SMTP_HOST is configured).
    email: Option<Arc<EmailService>>,

    /// Rate limiter shared by the public endpoints.
    rate_limiter: Arc<RateLimiter>,

    /// Per-endpoint rate limit policies.
    rate_limits: RateLimitConfig,

    /// Page cache for public catalog responses.
    page_cache: PageCache,

    /// Language negotiator chain (sorted by priority descending).
    ///
    /// Frozen at startup: changing site languages requires a restart.
    language_negotiators: Vec<Arc<dyn LanguageNegotiator>>,

    /// Known language codes.
    known_languages: Vec<String>,

    /// Default language code.
    default_language: String,
}

impl AppState {
    /// Create new application state: connect, migrate, wire services.
    pub async fn new(config: Config) -> Result<Self> {
        let db = db::create_pool(&config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        Self::with_pool(config, db)
    }

    /// Build state around an existing pool.
    ///
    /// Integration tests use this with a lazily-connected pool so routes
    /// that never touch the database can be exercised without one.
    pub fn with_pool(config: Config, db: PgPool) -> Result<Self> {
        let auth = AuthClient::new(
            &config.auth_base_url,
            &config.auth_api_key,
            &config.auth_jwt_secret,
        )
        .context("failed to create auth client")?;

        let translate = TranslateClient::new(
            &config.translate_api_url,
            config.translate_api_key.clone(),
        )
        .context("failed to create translate client")?;

        // Initialize email service (conditionally, when SMTP_HOST is set)
        let email = config.smtp_host.as_ref().and_then(|host| {
            match EmailService::new(
                host,
                config.smtp_port,
                config.smtp_username.as_deref(),
                config.smtp_password.as_deref(),
                &config.smtp_encryption,
                config.smtp_from_email.clone(),
                config.site_url.clone(),
            ) {
                Ok(svc) => {
                    info!(host = %host, port = config.smtp_port, "SMTP email service configured");
                    Some(Arc::new(svc))
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to initialize email service");
                    None
                }
            }
        });

        let rate_limiter = Arc::new(RateLimiter::new());
        let rate_limits = RateLimitConfig::default();

        let page_cache = PageCache::new();

        let known_languages = config.languages.clone();
        let default_language = config.default_language.clone();
        info!(
            languages = ?known_languages,
            default = %default_language,
            "site languages configured"
        );

        let mut language_negotiators: Vec<Arc<dyn LanguageNegotiator>> = vec![
            Arc::new(CookieNegotiator::new(known_languages.clone())),
            Arc::new(AcceptLanguageNegotiator::new(known_languages.clone())),
        ];
        language_negotiators.sort_by_key(|n| std::cmp::Reverse(n.priority()));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                config,
                auth,
                translate,
                email,
                rate_limiter,
                rate_limits,
                page_cache,
                language_negotiators,
                known_languages,
                default_language,
            }),
        })
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the identity service client.
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Get the translation service client.
    pub fn translate(&self) -> &TranslateClient {
        &self.inner.translate
    }

    /// Get the email service (if SMTP is configured).
    pub fn email(&self) -> Option<&Arc<EmailService>> {
        self.inner.email.as_ref()
    }

    /// Get the rate limiter.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.rate_limiter
    }

    /// Get the per-endpoint rate limit policies.
    pub fn rate_limits(&self) -> &RateLimitConfig {
        &self.inner.rate_limits
    }

    /// Get the page cache.
    pub fn page_cache(&self) -> &PageCache {
        &self.inner.page_cache
    }

    /// Get the language negotiator chain (sorted by priority descending).
    pub fn language_negotiators(&self) -> &[Arc<dyn LanguageNegotiator>] {
        &self.inner.language_negotiators
    }

    /// Get the known language codes.
    pub fn known_languages(&self) -> &[String] {
        &self.inner.known_languages
    }

    /// Get the default language code.
    pub fn default_language(&self) -> &str {
        &self.inner.default_language
    }

    /// Check database connectivity (best-effort, bounded).
    pub async fn database_status(&self) -> db::DatabaseStatus {
        db::probe(&self.inner.db).await
    }
}
