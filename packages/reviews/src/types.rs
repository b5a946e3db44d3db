// ABOUTME: Review request, status and result type definitions
// ABOUTME: Proposals pair each chat message with the tool call it produced

use chrono::{DateTime, Utc};
use sentinel_core::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatusKind {
    Pending,
    Assigned,
    Completed,
    Timeout,
    Failed,
}

impl ReviewStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "assigned" => Some(Self::Assigned),
            "completed" => Some(Self::Completed),
            "timeout" => Some(Self::Timeout),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    Escalate,
    Terminate,
    Modify,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Escalate => "escalate",
            Self::Terminate => "terminate",
            Self::Modify => "modify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "escalate" => Some(Self::Escalate),
            "terminate" => Some(Self::Terminate),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInput {
    pub role: String,
    pub content: String,
}

/// A tool call as submitted, before its message has an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequestInput {
    pub tool_id: String,
    pub arguments: Value,
}

/// One message and the tool call the agent wants to make from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallProposal {
    pub message: MessageInput,
    pub tool_id: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequestCreateInput {
    pub run_id: String,
    pub task_state: Value,
    pub proposals: Vec<ToolCallProposal>,
}

impl ReviewRequestCreateInput {
    /// Pair `messages[i]` with `tool_requests[i]`. Both lists must have the
    /// same length.
    pub fn from_parallel(
        run_id: impl Into<String>,
        task_state: Value,
        messages: Vec<MessageInput>,
        tool_requests: Vec<ToolRequestInput>,
    ) -> Result<Self, ValidationError> {
        if messages.len() != tool_requests.len() {
            return Err(ValidationError::LengthMismatch {
                messages: messages.len(),
                tool_requests: tool_requests.len(),
            });
        }

        let proposals = messages
            .into_iter()
            .zip(tool_requests)
            .map(|(message, request)| ToolCallProposal {
                message,
                tool_id: request.tool_id,
                arguments: request.arguments,
            })
            .collect();

        Ok(Self {
            run_id: run_id.into(),
            task_state,
            proposals,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStatus {
    pub id: String,
    pub review_request_id: String,
    pub status: ReviewStatusKind,
    pub created_at: DateTime<Utc>,
}

/// A review request with the latest entry of its status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub run_id: String,
    pub task_state: Value,
    pub status: Option<ReviewStatus>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub review_request_id: String,
    pub tool_id: String,
    pub message_id: String,
    pub arguments: Value,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub id: String,
    pub review_request_id: String,
    pub decision: Decision,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub tool_request: ToolRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResultCreateInput {
    pub review_request_id: String,
    pub tool_request_id: String,
    pub decision: Decision,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewFilter {
    pub run_id: Option<String>,
    /// Matches the current status only
    pub status: Option<ReviewStatusKind>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
