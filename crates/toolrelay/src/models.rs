//! These models represent the objects exchanged with the model backend
//!
//! The wire format is the Ollama chat API: messages carry a role, optional text content,
//! optional structured tool calls and, for tool results, the name of the tool that produced them.
//! Declarations of the local tools are advertised in the OpenAI function-calling shape that
//! Ollama accepts.
pub mod conversation;
pub mod message;
pub mod reply;
pub mod role;
pub mod tool;
