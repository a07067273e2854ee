use super::message::Message;
use super::tool::ToolCallRecord;

/// The ordered messages of a single exchange
///
/// A conversation always starts as `[system, user]` and only grows by appending. It is owned
/// by one call to the agent and dropped when that call returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new<S: Into<String>, U: Into<String>>(system_prompt: S, user_message: U) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_message)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append the assistant's tool calls followed by one tool message per result,
    /// both in dispatch order
    pub fn with_tool_round(mut self, calls: Vec<ToolCallRecord>, results: Vec<Message>) -> Self {
        self.messages.push(Message::assistant_tool_calls(calls));
        self.messages.extend(results);
        self
    }
}
