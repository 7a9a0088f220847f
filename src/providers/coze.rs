use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app_config::Language;
use crate::errors::ProviderError;
use crate::providers::PolishBackend;

/// Coze bot handling the polish prompts
const BOT_ID: &str = "7418029586187075592";

/// Interval between job status polls
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Overall deadline for one polish job, polls included
const JOB_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for each individual HTTP call
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the Coze chat API used as the content-polish backend.
///
/// Polishing is a three-step asynchronous protocol: create a chat job,
/// poll its status until completed, then fetch the message list. Callers
/// above this client decide what to do with failures; every step here
/// reports them as `ProviderError`.
#[derive(Debug)]
pub struct Coze {
    /// HTTP client for API requests
    client: Client,
    /// API key for bearer authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Chat creation request body
#[derive(Debug, Serialize)]
struct CreateChatRequest<'a> {
    bot_id: &'a str,
    user_id: &'a str,
    stream: bool,
    auto_save_history: bool,
    additional_messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    content_type: &'a str,
}

/// Envelope shared by all three calls
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Job identifiers returned by chat creation
#[derive(Debug, Deserialize)]
struct CreatedChat {
    conversation_id: String,
    id: String,
}

/// Poll response carries only the job status
#[derive(Debug, Deserialize)]
struct ChatStatus {
    #[serde(default)]
    status: String,
}

/// One message in the result list
#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(default)]
    content: String,
}

impl Coze {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn base_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.coze.com".to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Prompt prefix matching the target language's register
    fn prompt_for(target: Language) -> &'static str {
        match target {
            Language::Zh => "润色以下文本: ",
            Language::En => "Polish following content: ",
        }
    }

    /// Step 1: create the chat job, returning (conversation id, chat id)
    async fn create_chat(&self, content: &str) -> Result<(String, String), ProviderError> {
        let body = CreateChatRequest {
            bot_id: BOT_ID,
            user_id: "001",
            stream: false,
            auto_save_history: true,
            additional_messages: vec![ChatMessage {
                role: "user",
                content,
                content_type: "text",
            }],
        };

        let response = self
            .client
            .post(format!("{}/v3/chat", self.base_url()))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Coze create: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let created = response
            .json::<Envelope<CreatedChat>>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Coze create: {}", e)))?;

        Ok((created.data.conversation_id, created.data.id))
    }

    /// Step 2: check whether the job has completed
    async fn is_complete(
        &self,
        conversation_id: &str,
        chat_id: &str,
    ) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v3/chat/retrieve", self.base_url()))
            .bearer_auth(&self.api_key)
            .query(&[("conversation_id", conversation_id), ("chat_id", chat_id)])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Coze poll: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "poll failed".to_string(),
            });
        }

        let parsed = response
            .json::<Envelope<ChatStatus>>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Coze poll: {}", e)))?;

        Ok(parsed.data.status == "completed")
    }

    /// Step 3: fetch the first result message's content
    async fn fetch_result(
        &self,
        conversation_id: &str,
        chat_id: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v3/chat/message/list", self.base_url()))
            .bearer_auth(&self.api_key)
            .query(&[("conversation_id", conversation_id), ("chat_id", chat_id)])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Coze fetch: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "fetch failed".to_string(),
            });
        }

        let parsed = response
            .json::<Envelope<Vec<ResultMessage>>>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Coze fetch: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|m| m.content)
            .ok_or_else(|| ProviderError::ParseError("Coze fetch: empty message list".to_string()))
    }

    /// Run the full create/poll/fetch protocol once
    async fn run_job(&self, content: &str, target: Language) -> Result<String, ProviderError> {
        let prompt = format!("{}{}", Self::prompt_for(target), content);
        let (conversation_id, chat_id) = self.create_chat(&prompt).await?;
        debug!("Coze job created: conversation={} chat={}", conversation_id, chat_id);

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            if self.is_complete(&conversation_id, &chat_id).await? {
                return self.fetch_result(&conversation_id, &chat_id).await;
            }
            debug!("Coze job {} still running", chat_id);
        }
    }
}

#[async_trait]
impl PolishBackend for Coze {
    async fn polish(&self, content: &str, target: Language) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredentials(
                "Coze API key is not configured".to_string(),
            ));
        }

        match tokio::time::timeout(JOB_TIMEOUT, self.run_job(content, target)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Coze job timed out after {:?}", JOB_TIMEOUT);
                Err(ProviderError::RequestFailed(format!(
                    "polish job exceeded {:?}",
                    JOB_TIMEOUT
                )))
            }
        }
    }
}
