use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::models::reply::ModelReply;
use crate::models::tool::{ToolCall, ToolCallRecord, ToolDeclaration};
use crate::normalizer::normalize;
use crate::prompt_template::{load_embedded_prompt, load_prompt_file};
use crate::providers::base::Provider;
use crate::tools::ToolRegistry;

/// Returned when the model neither answers nor asks for a tool
pub const NO_CONTENT: &str = "No content from model";

#[derive(Serialize)]
struct PromptContext<'a> {
    tools: &'a [ToolDeclaration],
}

/// The assistant-side records and tool-side messages produced by one dispatch pass
#[derive(Debug, Default)]
struct ToolRound {
    calls: Vec<ToolCallRecord>,
    results: Vec<Message>,
}

/// Agent drives one user message through the model and the local tools
///
/// Each call to [`Agent::reply`] is independent: at most two rounds with the model, and
/// nothing carried over to the next call.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: Arc<ToolRegistry>,
    declarations: Vec<ToolDeclaration>,
    system_prompt: String,
}

impl Agent {
    /// Create an agent whose system prompt is rendered from the embedded template
    pub fn new(provider: Box<dyn Provider>, registry: Arc<ToolRegistry>) -> AgentResult<Self> {
        let declarations = registry.declarations();
        let system_prompt = load_embedded_prompt(
            "system.md",
            &PromptContext {
                tools: &declarations,
            },
        )
        .map_err(|e| AgentError::Internal(e.to_string()))?;

        Ok(Self::with_system_prompt(provider, registry, system_prompt))
    }

    /// Create an agent whose system prompt is rendered from a template file
    pub fn from_prompt_file(
        provider: Box<dyn Provider>,
        registry: Arc<ToolRegistry>,
        template: impl AsRef<Path>,
    ) -> AgentResult<Self> {
        let declarations = registry.declarations();
        let system_prompt = load_prompt_file(
            template,
            &PromptContext {
                tools: &declarations,
            },
        )
        .map_err(|e| AgentError::Internal(e.to_string()))?;

        Ok(Self::with_system_prompt(provider, registry, system_prompt))
    }

    pub fn with_system_prompt<S: Into<String>>(
        provider: Box<dyn Provider>,
        registry: Arc<ToolRegistry>,
        system_prompt: S,
    ) -> Self {
        let declarations = registry.declarations();
        Self {
            provider,
            registry,
            declarations,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer a single user message, calling tools if the model asks for them
    pub async fn reply(&self, user_message: &str) -> AgentResult<String> {
        if user_message.is_empty() {
            return Err(AgentError::MissingInput);
        }

        let conversation = Conversation::new(self.system_prompt.as_str(), user_message);
        let reply = self
            .provider
            .send(conversation.messages(), Some(self.declarations.as_slice()))
            .await?;

        let tool_calls = normalize(&reply);
        if tool_calls.is_empty() {
            return Ok(Self::direct_answer(&reply));
        }

        let round = self.dispatch_tool_calls(tool_calls).await?;
        let followup = conversation.with_tool_round(round.calls, round.results);

        tracing::debug!(messages = followup.messages().len(), "sending follow-up round");
        let final_reply = self.provider.send(followup.messages(), None).await?;

        Ok(final_reply.message.content.unwrap_or_default())
    }

    fn direct_answer(reply: &ModelReply) -> String {
        reply.content().unwrap_or(NO_CONTENT).to_string()
    }

    /// Run the requested tools one after another, in the order the model listed them
    ///
    /// The first unknown tool or failing tool ends the whole pass; later calls never run.
    async fn dispatch_tool_calls(&self, tool_calls: Vec<ToolCall>) -> AgentResult<ToolRound> {
        let mut round = ToolRound::default();

        for (index, call) in tool_calls.into_iter().enumerate() {
            let tool = self.registry.resolve(&call.name).ok_or_else(|| {
                tracing::warn!(name = %call.name, "model requested an unknown tool");
                AgentError::UnknownTool(call.name.clone())
            })?;

            tracing::info!(name = %call.name, arguments = %call.arguments, "calling tool");
            let result = tool
                .invoke(call.arguments.clone())
                .await
                .map_err(|source| AgentError::ToolExecution {
                    name: call.name.clone(),
                    source,
                })?;

            round
                .results
                .push(Message::tool_result(call.name.as_str(), result.to_string()));
            round.calls.push(call.into_record(index));
        }

        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::models::role::Role;
    use crate::providers::mock::MockProvider;
    use crate::tools::{Tool, ToolError, ToolResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A tool that always fails and counts its invocations
    struct FailingTool {
        declaration: ToolDeclaration,
        calls: Arc<AtomicUsize>,
    }

    impl FailingTool {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            Self {
                declaration: ToolDeclaration::new("explode", "Always fails", json!({})),
                calls,
            }
        }
    }

    #[async_trait]
    impl Tool for FailingTool {
        fn declaration(&self) -> &ToolDeclaration {
            &self.declaration
        }

        async fn invoke(&self, _arguments: Value) -> ToolResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ToolError::ExecutionError("boom".to_string()))
        }
    }

    fn agent(provider: &MockProvider) -> Agent {
        agent_with_registry(provider, ToolRegistry::commerce())
    }

    fn agent_with_registry(provider: &MockProvider, registry: ToolRegistry) -> Agent {
        Agent::with_system_prompt(Box::new(provider.clone()), Arc::new(registry), "system prompt")
    }

    fn call(name: &str, arguments: Value) -> ToolCallRecord {
        ToolCall::new(name, arguments).into_record(0)
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = MockProvider::new(vec![ModelReply::text("Hello! How can I help?")]);
        let agent = agent(&provider);

        let answer = agent.reply("hi").await.unwrap();
        assert_eq!(answer, "Hello! How can I help?");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(requests[0].messages[0].content.as_deref(), Some("system prompt"));
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_empty_reply_gets_placeholder() {
        let provider = MockProvider::new(vec![ModelReply::text("")]);
        let answer = agent(&provider).reply("hi").await.unwrap();
        assert_eq!(answer, NO_CONTENT);
    }

    #[tokio::test]
    async fn test_unparseable_content_is_the_answer() {
        let provider = MockProvider::new(vec![ModelReply::text("[not json")]);
        let answer = agent(&provider).reply("hi").await.unwrap();
        assert_eq!(answer, "[not json");
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_makes_no_call() {
        let provider = MockProvider::new(vec![]);
        let result = agent(&provider).reply("").await;
        assert!(matches!(result, Err(AgentError::MissingInput)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = MockProvider::new(vec![
            ModelReply::tool_calls(vec![call("searchOrder", json!({"orderId": "1001"}))]),
            ModelReply::text("Your order has shipped."),
        ]);
        let agent = agent(&provider);

        let answer = agent.reply("Where is order 1001?").await.unwrap();
        assert_eq!(answer, "Your order has shipped.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].tools.is_some());
        assert!(requests[1].tools.is_none());

        let followup = &requests[1].messages;
        assert_eq!(followup.len(), 4);
        assert_eq!(followup[0], Message::system("system prompt"));
        assert_eq!(followup[1], Message::user("Where is order 1001?"));
        assert_eq!(
            followup[2],
            Message::assistant_tool_calls(vec![ToolCall::new(
                "searchOrder",
                json!({"orderId": "1001"})
            )
            .into_record(0)])
        );
        assert_eq!(followup[3].role, Role::Tool);
        assert_eq!(followup[3].tool_name.as_deref(), Some("searchOrder"));

        let result: Value = serde_json::from_str(followup[3].content.as_deref().unwrap()).unwrap();
        assert_eq!(
            result,
            json!({"orderId": "1001", "status": "shipped", "total": 49.99})
        );
    }

    #[tokio::test]
    async fn test_tools_dispatched_in_model_order() {
        let provider = MockProvider::new(vec![
            ModelReply::tool_calls(vec![
                call("logUserAction", json!({"userid": "u1", "action": "lookup"})),
                call("searchOrder", json!({"orderId": "1002"})),
                call("calculatePrice", json!({"items": [{"qty": 1, "price": 10.0}]})),
            ]),
            ModelReply::text("done"),
        ]);

        agent(&provider).reply("do it all").await.unwrap();

        let followup = &provider.requests()[1].messages;
        let records = followup[2].tool_calls.as_ref().unwrap();
        let indexed: Vec<(Option<usize>, &str)> = records
            .iter()
            .map(|r| (r.function.index, r.function.name.as_str()))
            .collect();
        assert_eq!(
            indexed,
            vec![
                (Some(0), "logUserAction"),
                (Some(1), "searchOrder"),
                (Some(2), "calculatePrice"),
            ]
        );

        let tool_names: Vec<&str> = followup[3..]
            .iter()
            .map(|m| m.tool_name.as_deref().unwrap())
            .collect();
        assert_eq!(tool_names, vec!["logUserAction", "searchOrder", "calculatePrice"]);
    }

    #[tokio::test]
    async fn test_text_fallback_tool_call() {
        let provider = MockProvider::new(vec![
            ModelReply::text(r#"[{"name": "searchOrder", "arguments": {"orderId": "1002"}}]"#),
            ModelReply::text("Your order is being processed."),
        ]);

        let answer = agent(&provider).reply("Where is order 1002?").await.unwrap();
        assert_eq!(answer, "Your order is being processed.");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_stops_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ToolRegistry::commerce()
            .with_tool(Box::new(FailingTool::new(calls.clone())))
            .unwrap();
        let provider = MockProvider::new(vec![
            ModelReply::tool_calls(vec![
                call("refundOrder", json!({"orderId": "1001"})),
                call("explode", json!({})),
            ]),
            ModelReply::text("never sent"),
        ]);

        let result = agent_with_registry(&provider, registry).reply("refund it").await;

        match result {
            Err(AgentError::UnknownTool(name)) => assert_eq!(name, "refundOrder"),
            other => panic!("expected unknown tool, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_failure_aborts_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ToolRegistry::new()
            .with_tool(Box::new(FailingTool::new(calls.clone())))
            .unwrap();
        let provider = MockProvider::new(vec![
            ModelReply::tool_calls(vec![call("explode", json!({})), call("explode", json!({}))]),
            ModelReply::text("never sent"),
        ]);

        let result = agent_with_registry(&provider, registry).reply("go").await;

        assert!(matches!(
            result,
            Err(AgentError::ToolExecution { ref name, .. }) if name == "explode"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_on_first_round() {
        let provider = MockProvider::with_results(vec![Err(ProviderError::Status(503))]);
        let result = agent(&provider).reply("hi").await;

        let err = result.unwrap_err();
        assert!(matches!(err, AgentError::Backend(ProviderError::Status(503))));
        assert_eq!(err.to_string(), "LLM error: 503");
    }

    #[tokio::test]
    async fn test_backend_failure_on_follow_up() {
        let provider = MockProvider::with_results(vec![
            Ok(ModelReply::tool_calls(vec![call("searchOrder", json!({"orderId": "1001"}))])),
            Err(ProviderError::Status(500)),
        ]);
        let result = agent(&provider).reply("Where is order 1001?").await;

        assert!(matches!(result, Err(AgentError::Backend(ProviderError::Status(500)))));
        assert_eq!(provider.requests().len(), 2);
    }

    #[test]
    fn test_embedded_system_prompt() {
        let provider = MockProvider::new(vec![]);
        let agent = Agent::new(Box::new(provider), Arc::new(ToolRegistry::commerce())).unwrap();
        assert!(agent.system_prompt().contains("searchOrder"));
        assert!(agent.system_prompt().contains("calculatePrice"));
        assert!(agent.system_prompt().contains("logUserAction"));
    }

    #[test]
    fn test_prompt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("prompt.md");
        std::fs::write(&file_path, "{{ tools | length }} tools").unwrap();

        let provider = MockProvider::new(vec![]);
        let agent = Agent::from_prompt_file(
            Box::new(provider),
            Arc::new(ToolRegistry::commerce()),
            &file_path,
        )
        .unwrap();
        assert_eq!(agent.system_prompt(), "3 tools");
    }
}
