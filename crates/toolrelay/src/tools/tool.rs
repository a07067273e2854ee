use async_trait::async_trait;
use serde_json::Value;

use super::ToolResult;
use crate::models::tool::ToolDeclaration;

/// A capability the model can ask to have executed locally
#[async_trait]
pub trait Tool: Send + Sync {
    /// The declaration advertised to the model; its name is the lookup key
    fn declaration(&self) -> &ToolDeclaration;

    /// Execute with the arguments the model supplied, producing a JSON result
    async fn invoke(&self, arguments: Value) -> ToolResult<Value>;

    fn name(&self) -> &str {
        &self.declaration().name
    }
}
