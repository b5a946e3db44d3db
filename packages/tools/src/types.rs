// ABOUTME: Tool and supervisor type definitions
// ABOUTME: Logical keys are (name, description, attributes) for tools and code for supervisors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorType {
    HumanSupervisor,
    ClientSupervisor,
    NoSupervisor,
}

impl SupervisorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HumanSupervisor => "human_supervisor",
            Self::ClientSupervisor => "client_supervisor",
            Self::NoSupervisor => "no_supervisor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "human_supervisor" => Some(Self::HumanSupervisor),
            "client_supervisor" => Some(Self::ClientSupervisor),
            "no_supervisor" => Some(Self::NoSupervisor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub description: String,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCreateInput {
    pub name: String,
    pub description: String,
    /// Opaque document; identical documents resolve to the same tool
    pub attributes: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervisor {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub supervisor_type: SupervisorType,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorCreateInput {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub supervisor_type: SupervisorType,
}
