use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::configs::OllamaProviderConfig;
use crate::models::message::Message;
use crate::models::tool::ToolDeclaration;

/// Convert tool declarations to the function-calling specification
pub fn tools_to_spec(tools: &[ToolDeclaration]) -> Vec<Value> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            tracing::warn!(name = %tool.name, "skipping duplicate tool declaration");
            continue;
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters(),
            }
        }));
    }

    result
}

/// Build the body of a non-streaming chat request
pub fn chat_payload(
    config: &OllamaProviderConfig,
    messages: &[Message],
    tools: Option<&[ToolDeclaration]>,
) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), json!(config.model));
    payload.insert("messages".to_string(), json!(messages));
    payload.insert("stream".to_string(), json!(false));

    if let Some(tools) = tools {
        payload.insert("tools".to_string(), json!(tools_to_spec(tools)));
    }

    let mut options = Map::new();
    if let Some(temp) = config.temperature {
        options.insert("temperature".to_string(), json!(temp));
    }
    if let Some(tokens) = config.max_tokens {
        options.insert("num_predict".to_string(), json!(tokens));
    }
    if !options.is_empty() {
        payload.insert("options".to_string(), Value::Object(options));
    }

    Value::Object(payload)
}
