use super::{CalculatePrice, LogUserAction, SearchOrder, Tool, ToolError};
use crate::models::tool::ToolDeclaration;

/// The fixed set of tools available to the agent
///
/// Built once at startup and only read afterwards, so a single registry can be shared by
/// any number of in-flight requests.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The order lookup, price calculation and action logging tools
    pub fn commerce() -> Self {
        Self {
            tools: vec![
                Box::new(SearchOrder::new()),
                Box::new(CalculatePrice::new()),
                Box::new(LogUserAction::new()),
            ],
        }
    }

    /// Add a tool, rejecting a name that is already registered
    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Result<Self, ToolError> {
        if self.resolve(tool.name()).is_some() {
            return Err(ToolError::InvalidParameters(format!(
                "Duplicate tool name: {}",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(self)
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| &**tool)
    }

    /// Declarations of every tool, in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .iter()
            .map(|tool| tool.declaration().clone())
            .collect()
    }
}
