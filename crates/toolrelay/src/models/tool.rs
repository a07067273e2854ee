use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A tool advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDeclaration {
    /// The name of the tool, unique within a registry
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema properties of the accepted arguments
    pub properties: Value,
    /// Names of the arguments that must be present
    pub required: Vec<String>,
}

impl ToolDeclaration {
    pub fn new<N, D>(name: N, description: D, properties: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolDeclaration {
            name: name.into(),
            description: description.into(),
            properties,
            required: Vec::new(),
        }
    }

    pub fn with_required<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = required.into_iter().map(Into::into).collect();
        self
    }

    /// The parameter schema in the shape function-calling models expect
    pub fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Record this call at the given dispatch position, for the assistant side of the follow-up
    pub fn into_record(self, index: usize) -> ToolCallRecord {
        ToolCallRecord {
            kind: "function".to_string(),
            function: FunctionCall {
                index: Some(index),
                name: self.name,
                arguments: self.arguments,
            },
        }
    }
}

/// One entry of a `tool_calls` list as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRecord {
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

impl From<&ToolCallRecord> for ToolCall {
    fn from(record: &ToolCallRecord) -> Self {
        ToolCall::new(record.function.name.clone(), record.function.arguments.clone())
    }
}
