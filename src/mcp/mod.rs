pub mod client;
pub mod tools;
pub mod types;

pub use client::McpClient;
pub use types::{McpTool, McpToolCall, McpToolResult};
