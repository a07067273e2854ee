use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCallRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
///
/// `content` is only `None` on an assistant message that carries `tool_calls`, and is then
/// serialized as an explicit `null`.
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn text<S: Into<String>>(role: Role, text: S) -> Self {
        Message {
            role,
            content: Some(text.into()),
            tool_calls: None,
            tool_name: None,
        }
    }

    pub fn system<S: Into<String>>(text: S) -> Self {
        Self::text(Role::System, text)
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::text(Role::User, text)
    }

    /// An assistant turn that only requested tools, recorded for the follow-up round
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCallRecord>) -> Self {
        Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(tool_calls),
            tool_name: None,
        }
    }

    /// The serialized result of one tool execution
    pub fn tool_result<N: Into<String>, S: Into<String>>(tool_name: N, content: S) -> Self {
        Message {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_name: Some(tool_name.into()),
        }
    }
}
