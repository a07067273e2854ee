//! Reconciles the two ways a model can ask for tools.
//!
//! Ollama normally reports tool requests in `message.tool_calls`. Some model and template
//! combinations drop that metadata and print the call as JSON text instead, so the content is
//! given a second look when no structured calls are present.
use serde::Deserialize;

use crate::models::reply::{ModelReply, ReplyMessage};
use crate::models::tool::{ToolCall, ToolCallRecord};

/// How a reply encodes its tool requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyShape<'a> {
    Structured(&'a [ToolCallRecord]),
    TextFallback(&'a str),
    None,
}

impl<'a> ReplyShape<'a> {
    pub fn of(message: &'a ReplyMessage) -> Self {
        match (&message.tool_calls, &message.content) {
            (Some(calls), _) if !calls.is_empty() => ReplyShape::Structured(calls),
            (_, Some(text)) if !text.is_empty() => ReplyShape::TextFallback(text),
            _ => ReplyShape::None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextToolCalls {
    Many(Vec<ToolCall>),
    One(ToolCall),
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{' | '['))
}

/// Parse tool calls printed as text; anything that isn't a call or list of calls yields `None`
fn parse_text_calls(text: &str) -> Option<Vec<ToolCall>> {
    match serde_json::from_str::<TextToolCalls>(text) {
        Ok(TextToolCalls::Many(calls)) => Some(calls),
        Ok(TextToolCalls::One(call)) => Some(vec![call]),
        Err(e) if looks_like_json(text) => {
            tracing::warn!(
                error = %e,
                "malformed tool call in reply content, treating it as an answer"
            );
            None
        }
        Err(_) => {
            tracing::debug!("reply content is a plain answer");
            None
        }
    }
}

/// The tool invocations a reply asks for, in the order the model listed them
pub fn normalize(reply: &ModelReply) -> Vec<ToolCall> {
    match ReplyShape::of(&reply.message) {
        ReplyShape::Structured(records) => {
            tracing::debug!(count = records.len(), "got structured tool_calls");
            records.iter().map(ToolCall::from).collect()
        }
        ReplyShape::TextFallback(text) => {
            tracing::debug!("no tool_calls in reply, trying to parse content");
            parse_text_calls(text).unwrap_or_default()
        }
        ReplyShape::None => Vec::new(),
    }
}
