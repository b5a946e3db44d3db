// ABOUTME: Tool and supervisor registry for Sentinel
// ABOUTME: Deduplicates by logical key and tracks which runs use which tools

pub mod storage;
pub mod types;

pub use storage::ToolStorage;
pub use types::{Supervisor, SupervisorCreateInput, SupervisorType, Tool, ToolCreateInput};
