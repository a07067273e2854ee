use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::reply::ModelReply;
use crate::models::tool::ToolDeclaration;

/// Gateway to a chat model backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send one round to the model. Tools are only advertised when `tools` is given.
    ///
    /// A single attempt is made; any failure is returned to the caller as is.
    async fn send(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ModelReply, ProviderError>;
}
