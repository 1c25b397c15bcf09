//! Client for the external identity service.
//!
//! The identity service holds the user accounts and mints HS256 access
//! tokens; this backend verifies those tokens locally and exchanges refresh
//! tokens over HTTP.

use anyhow::{Context, Result};
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

/// Outbound call timeout for the identity service.
const AUTH_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// A refreshed session returned by the identity service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Verified claims of an access token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// User id at the identity service (matches `profile.id`).
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: i64,
}

/// Identity service client.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    decoding_key: DecodingKey,
}

impl AuthClient {
    /// Create a new identity service client.
    pub fn new(base_url: &str, api_key: &str, jwt_secret: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(AUTH_HTTP_TIMEOUT)
            .build()
            .context("failed to build auth HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        })
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=refresh_token", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .context("identity service unreachable")?;

        if !response.status().is_success() {
            anyhow::bail!("token refresh rejected with status {}", response.status());
        }

        let session = response
            .json::<AuthSession>()
            .await
            .context("malformed token refresh response")?;

        Ok(session)
    }

    /// Verify an access token signature and expiry, returning its claims.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .context("invalid access token")?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Read the `exp` claim of a JWT without verifying the signature.
///
/// Used only to decide *when* to refresh; authorization always goes through
/// [`AuthClient::verify_access_token`].
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}
