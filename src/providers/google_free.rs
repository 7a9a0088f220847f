use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::Value;

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, ensure_batch_fits};

/// The free endpoint has no batch support, every text is its own request
const MAX_BATCH_SIZE: usize = 1;

/// Client for the unofficial free Google translate endpoint.
///
/// The response is an untyped nested array: `response[0]` is a list of
/// `[translatedChunk, sourceChunk, ...]` segments whose first elements are
/// concatenated to form the full translation.
#[derive(Debug)]
pub struct GoogleFree {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

impl GoogleFree {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://translate.googleapis.com/translate_a/single".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Join the translated segments out of the nested-array response
    fn extract_translation(value: &Value) -> Result<String, ProviderError> {
        let segments = value
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::ParseError("Google Free: response[0] is not an array".to_string())
            })?;

        let mut out = String::new();
        for segment in segments {
            if let Some(chunk) = segment.get(0).and_then(Value::as_str) {
                out.push_str(chunk);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl TranslationBackend for GoogleFree {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::GoogleFree
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
        let Some(text) = texts.first() else {
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(self.api_url())
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("q", text.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Google Free: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Free API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google Free: {}", e)))?;

        Ok(vec![Self::extract_translation(&value)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_should_concatenate_segments() {
        let value = json!([[["你好", "Hello", null], ["，世界", ", world", null]], null, "en"]);
        let out = GoogleFree::extract_translation(&value).unwrap();
        assert_eq!(out, "你好，世界");
    }

    #[test]
    fn test_extract_translation_should_reject_malformed_shape() {
        let value = json!({"unexpected": "object"});
        assert!(GoogleFree::extract_translation(&value).is_err());
    }

    #[test]
    fn test_extract_translation_should_skip_non_string_chunks() {
        let value = json!([[[null, "Hello"], ["好", "good"]]]);
        let out = GoogleFree::extract_translation(&value).unwrap();
        assert_eq!(out, "好");
    }

    #[tokio::test]
    async fn test_translate_should_enforce_single_item_batches() {
        let client = GoogleFree::new("");
        let result = client
            .translate(
                &["a".to_string(), "b".to_string()],
                Language::En,
                Language::Zh,
                false,
            )
            .await;
        assert!(result.is_err());
    }
}
