//! Tool trait and execution types

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use clinic_agent_core::{ToolDeclaration, ToolErrorKind};

use crate::kind::ToolKind;

/// Default timeout for tool execution (seconds)
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 15;

/// Authenticated identity of the conversation's caller
///
/// Authorization-sensitive parameters come from here, never from the
/// model's arguments: a hallucinated `patient_id` argument cannot
/// impersonate another patient.
#[derive(Debug, Clone)]
pub struct CallerContext {
    /// Authenticated patient
    pub patient_id: Uuid,
    /// Clinic the conversation belongs to
    pub clinic_id: Uuid,
    /// Whether the caller is clinic staff (bookings are pre-approved)
    pub staff: bool,
}

impl CallerContext {
    pub fn patient(patient_id: Uuid, clinic_id: Uuid) -> Self {
        Self {
            patient_id,
            clinic_id,
            staff: false,
        }
    }

    pub fn staff(patient_id: Uuid, clinic_id: Uuid) -> Self {
        Self {
            patient_id,
            clinic_id,
            staff: true,
        }
    }
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Tool '{tool}' timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn slot_unavailable(message: impl Into<String>) -> Self {
        Self::SlotUnavailable(message.into())
    }

    pub fn timeout(tool: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            secs,
        }
    }

    /// Classification carried in the result payload
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::InvalidParams(_) => ToolErrorKind::Validation,
            Self::SlotUnavailable(_) => ToolErrorKind::SlotUnavailable,
            Self::Execution(_) | Self::Timeout { .. } => ToolErrorKind::Execution,
        }
    }
}

/// Successful tool output
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// JSON payload fed back to the model
    pub value: Value,
}

impl ToolOutput {
    pub fn json(value: Value) -> Self {
        Self { value }
    }
}

/// Tool trait
///
/// Implementations are pure adapters from validated JSON arguments plus
/// the caller context onto the scheduling services.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Typed identifier
    fn kind(&self) -> ToolKind;

    /// Wire name
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Declaration sent to the model gateway
    fn declaration(&self) -> ToolDeclaration;

    /// Execute with already-validated arguments
    async fn execute(&self, arguments: Value, ctx: &CallerContext)
        -> Result<ToolOutput, ToolError>;

    /// Per-tool execution timeout
    fn timeout_secs(&self) -> u64 {
        DEFAULT_TOOL_TIMEOUT_SECS
    }
}
