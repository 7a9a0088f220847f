use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, ensure_batch_fits};

const MAX_BATCH_SIZE: usize = 50;

/// Client for the Google Cloud Translation v3 API with glossary support.
///
/// When termbase mode is on the request carries a `glossaryConfig` and the
/// response's `glossaryTranslations` field takes precedence over the plain
/// `translations` field.
#[derive(Debug)]
pub struct GoogleAdvanced {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Fully qualified glossary resource name, empty to disable
    glossary: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Translation v3 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    contents: &'a [String],
    #[serde(rename = "sourceLanguageCode")]
    source_language_code: &'a str,
    #[serde(rename = "targetLanguageCode")]
    target_language_code: &'a str,
    #[serde(rename = "glossaryConfig", skip_serializing_if = "Option::is_none")]
    glossary_config: Option<GlossaryConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct GlossaryConfig<'a> {
    glossary: &'a str,
}

/// Translation v3 response; the glossary variant is present only when a
/// glossary config was sent and matched
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
    #[serde(rename = "glossaryTranslations", default)]
    glossary_translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText", default)]
    translated_text: String,
}

impl GoogleAdvanced {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        glossary: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            glossary: glossary.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://translation.googleapis.com/v3/projects/-:translateText".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }
}

#[async_trait]
impl TranslationBackend for GoogleAdvanced {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::GoogleAdvanced
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn translate(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
        termbase: bool,
    ) -> Result<Vec<String>, ProviderError> {
        ensure_batch_fits(texts, MAX_BATCH_SIZE)?;
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials(
                "Google API key is not configured".to_string(),
            ));
        }

        let glossary_config = if termbase && !self.glossary.is_empty() {
            Some(GlossaryConfig {
                glossary: &self.glossary,
            })
        } else {
            None
        };
        let glossary_requested = glossary_config.is_some();

        let body = TranslateRequest {
            contents: texts,
            source_language_code: source.code(),
            target_language_code: target.code(),
            glossary_config,
        };

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Google Advanced: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Advanced API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Google Advanced: {}", e)))?;

        // Glossary-backed results win when we asked for them and they exist
        let source_list = if glossary_requested && !parsed.glossary_translations.is_empty() {
            parsed.glossary_translations
        } else {
            parsed.translations
        };

        let translations: Vec<String> = source_list
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
