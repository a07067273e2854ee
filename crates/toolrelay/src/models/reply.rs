use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCallRecord;

/// The structured reply of one round with the model backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    pub message: ReplyMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(default = "assistant_role")]
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
}

fn assistant_role() -> Role {
    Role::Assistant
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl ModelReply {
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self::from_message(ReplyMessage {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_calls: None,
        })
    }

    pub fn tool_calls(tool_calls: Vec<ToolCallRecord>) -> Self {
        Self::from_message(ReplyMessage {
            role: Role::Assistant,
            content: Some(String::new()),
            tool_calls: Some(tool_calls),
        })
    }

    fn from_message(message: ReplyMessage) -> Self {
        ModelReply {
            message,
            model: None,
            prompt_eval_count: None,
            eval_count: None,
        }
    }

    /// The reply text, if the model produced any
    pub fn content(&self) -> Option<&str> {
        self.message.content.as_deref().filter(|text| !text.is_empty())
    }

    pub fn usage(&self) -> Usage {
        let total_tokens = match (self.prompt_eval_count, self.eval_count) {
            (Some(input), Some(output)) => input.checked_add(output),
            _ => None,
        };
        Usage {
            input_tokens: self.prompt_eval_count,
            output_tokens: self.eval_count,
            total_tokens,
        }
    }
}
