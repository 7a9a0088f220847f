use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, ensure_batch_fits};

/// Largest batch the v2 endpoint accepts in one request
const MAX_BATCH_SIZE: usize = 50;

/// Client for the Google Cloud Translation v2 API
#[derive(Debug)]
pub struct GoogleBasic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Translation v2 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate
    q: &'a [String],
    /// Source language code
    source: &'a str,
    /// Target language code
    target: &'a str,
}

/// Translation v2 response envelope
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

/// One translated item
#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText", default)]
    translated_text: String,
}

impl GoogleBasic {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://translation.googleapis.com/language/translate/v2".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

#[async_trait]
impl TranslationBackend for GoogleBasic {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::GoogleBasic
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn translate(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
        _termbase: bool,
    ) -> Result<Vec<String>, ProviderError> {
        ensure_batch_fits(texts, MAX_BATCH_SIZE)?;
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials(
                "Google API key is not configured".to_string(),
            ));
        }

        let body = TranslateRequest {
            q: texts,
            source: source.code(),
            target: target.code(),
        };

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Google Basic: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Basic API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google Basic: {}", e)))?;

        let translations: Vec<String> = parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect();

        if translations.len() != texts.len() {
            return Err(ProviderError::IncompleteResponse {
                expected: texts.len(),
                received: translations.len(),
            });
        }

        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_should_default_to_public_endpoint() {
        let client = GoogleBasic::new("key", "");
        assert_eq!(
            client.api_url(),
            "https://translation.googleapis.com/language/translate/v2"
        );
    }

    #[test]
    fn test_api_url_should_strip_trailing_slash() {
        let client = GoogleBasic::new("key", "http://localhost:9000/v2/");
        assert_eq!(client.api_url(), "http://localhost:9000/v2");
    }

    #[tokio::test]
    async fn test_translate_without_key_should_fail_fast() {
        let client = GoogleBasic::new("", "");
        let result = client
            .translate(&["hello".to_string()], Language::En, Language::Zh, false)
            .await;
        assert!(matches!(result, Err(ProviderError::MissingCredentials(_))));
    }

    #[test]
    fn test_response_parsing_should_extract_translated_text() {
        let raw = r#"{"data":{"translations":[{"translatedText":"你好"},{"translatedText":"世界"}]}}"#;
        let parsed: TranslateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data.translations.len(), 2);
        assert_eq!(parsed.data.translations[0].translated_text, "你好");
    }
}
