//! Client for the external machine-translation service.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Outbound call timeout for the translation service.
const TRANSLATE_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Translation failures.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The upstream service answered non-2xx, was unreachable, or returned
    /// a body we cannot use.
    #[error("translation service unavailable")]
    Unavailable,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Machine-translation service client.
pub struct TranslateClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl TranslateClient {
    /// Create a new translation client.
    pub fn new(api_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TRANSLATE_HTTP_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build translate HTTP client: {e}"))?;

        Ok(Self {
            http,
            api_url: api_url.to_string(),
            api_key,
        })
    }

    /// Translate `text` from `source` to `target` language.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let mut body = serde_json::json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }

        let response = self
            .http
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "translation service unreachable");
                TranslateError::Unavailable
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "translation service returned an error");
            return Err(TranslateError::Unavailable);
        }

        let parsed = response.json::<TranslateResponse>().await.map_err(|e| {
            warn!(error = %e, "malformed translation service response");
            TranslateError::Unavailable
        })?;

        Ok(parsed.translated_text)
    }
}

impl std::fmt::Debug for TranslateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateClient")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_upstream_maps_to_unavailable() {
        // Nothing listens on port 1.
        let client = TranslateClient::new("http://127.0.0.1:1/translate", None).unwrap();
        let result = client.translate("bonjour", "fr", "en").await;
        assert!(matches!(result, Err(TranslateError::Unavailable)));
    }

    #[test]
    fn response_shape_parses() {
        let parsed: TranslateResponse =
            serde_json::from_str(r#"{"translatedText":"hello"}"#).unwrap();
        assert_eq!(parsed.translated_text, "hello");
    }
}
