use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::base::Provider;
use super::configs::OllamaProviderConfig;
use super::utils::chat_payload;
use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::reply::ModelReply;
use crate::models::tool::ToolDeclaration;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5";

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<ModelReply, ProviderError> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));

        tracing::debug!(%url, body = %payload, "calling LLM");
        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "LLM request failed");
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let reply: ModelReply = serde_json::from_slice(&body)?;
        tracing::debug!(?reply, "LLM response");
        Ok(reply)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn send(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ModelReply, ProviderError> {
        let payload = chat_payload(&self.config, messages, tools);
        let reply = self.post(payload).await?;

        let usage = reply.usage();
        tracing::debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            total_tokens = ?usage.total_tokens,
            "LLM usage"
        );

        Ok(reply)
    }
}
