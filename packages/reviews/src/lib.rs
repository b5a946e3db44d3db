// ABOUTME: Review requests, status history and review results for Sentinel
// ABOUTME: Everything a supervisor needs to decide on an agent's proposed tool calls

pub mod results;
pub mod status;
pub mod storage;
pub mod types;

pub use storage::ReviewStorage;
pub use types::{
    Decision, Message, MessageInput, Review, ReviewFilter, ReviewRequestCreateInput, ReviewResult,
    ReviewResultCreateInput, ReviewStatus, ReviewStatusKind, ToolCallProposal, ToolRequest,
    ToolRequestInput,
};
