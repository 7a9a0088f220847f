use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::app_config::{Language, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, ensure_batch_fits};

const MAX_BATCH_SIZE: usize = 20;

/// Client for the Baidu fanyi API.
///
/// Requests are signed with a digest of `appid + query + salt + secret`.
/// Batching works by joining texts with `\n` and splitting the response's
/// `trans_result` entries back positionally.
#[derive(Debug)]
pub struct Baidu {
    /// HTTP client for API requests
    client: Client,
    /// Application id issued by Baidu
    app_id: String,
    /// Secret key used for request signing
    secret_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Baidu translate response envelope
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    trans_result: Vec<TransResult>,
    /// Present only on failure
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

/// One translated line
#[derive(Debug, Deserialize)]
struct TransResult {
    #[serde(default)]
    dst: String,
}

impl Baidu {
    /// Create a new client
    pub fn new(
        app_id: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            app_id: app_id.into(),
            secret_key: secret_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.fanyi.baidu.com/api/trans/vip/translate".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Hex digest of `appid + query + salt + secret`
    fn sign(&self, query: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.app_id.as_bytes());
        hasher.update(query.as_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(self.secret_key.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl TranslationBackend for Baidu {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::Baidu
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
        if self.app_id.is_empty() || self.secret_key.is_empty() {
            return Err(ProviderError::MissingCredentials(
                "Baidu app id or secret key is not configured".to_string(),
            ));
        }

        let query = texts.join("\n");
        let salt = chrono::Utc::now().timestamp_millis().to_string();
        let sign = self.sign(&query, &salt);
        let need_intervene = if termbase { "1" } else { "0" };

        let response = self
            .client
            .get(self.api_url())
            .query(&[
                ("q", query.as_str()),
                ("from", source.code()),
                ("to", target.code()),
                ("appid", self.app_id.as_str()),
                ("salt", salt.as_str()),
                ("sign", sign.as_str()),
                ("needIntervene", need_intervene),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Baidu: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Baidu API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Baidu: {}", e)))?;

        if let Some(code) = parsed.error_code {
            let message = parsed.error_msg.unwrap_or_default();
            error!("Baidu API rejected request ({}): {}", code, message);
            return Err(ProviderError::RequestFailed(format!(
                "Baidu error {}: {}",
                code, message
            )));
        }

        let translations: Vec<String> =
            parsed.trans_result.into_iter().map(|r| r.dst).collect();

        if translations.len() != texts.len() {
            return Err(ProviderError::IncompleteResponse {
                expected: texts.len(),
                received: translations.len(),
            });
        }

        Ok(translations)
    }
}
