// ABOUTME: Project and run records for monitored agents
// ABOUTME: Runs group the review requests and tools of one agent execution

pub mod storage;
pub mod types;

pub use storage::ProjectStorage;
pub use types::{Project, ProjectCreateInput, Run, RunCreateInput};
