mod commerce;
mod error;
mod registry;
mod tool;

pub use commerce::{CalculatePrice, LogUserAction, SearchOrder};
pub use error::{ToolError, ToolResult};
pub use registry::ToolRegistry;
pub use tool::Tool;
