//! Conversational agent for clinic scheduling
//!
//! The orchestrator owns the tool-calling loop: it sends the conversation
//! to the model gateway, executes any tool calls it asks for, feeds the
//! results back, and stops once the model answers in text or exhausts its
//! tool-round allowance. Sessions keep per-conversation history and the
//! authenticated caller's identity.

pub mod orchestrator;
pub mod session;

pub use orchestrator::{AgentOrchestrator, OrchestratorConfig};
pub use session::{ChatSession, SessionManager};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Gateway call failed after any retries
    #[error("Gateway error: {0}")]
    Gateway(#[from] clinic_agent_llm::GatewayError),

    /// The model kept requesting tools past the round allowance
    #[error("Model exceeded {max_rounds} tool rounds without a text reply")]
    ProtocolViolation { max_rounds: usize },

    /// Unknown or expired session
    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    /// Session table is full
    #[error("Session limit reached ({0})")]
    SessionLimitReached(usize),
}
