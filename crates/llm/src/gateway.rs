//! Model gateway trait

use async_trait::async_trait;

use clinic_agent_core::{ConversationTurn, ToolCallRequest, ToolDeclaration};

use crate::GatewayError;

/// Parsed gateway response: assistant text, tool-call requests, or both
#[derive(Debug, Clone, Default)]
pub struct GatewayResponse {
    /// Assistant text, if the model replied conversationally
    pub text: Option<String>,
    /// Tool invocations the model requested, in issue order
    pub tool_calls: Vec<ToolCallRequest>,
}

impl GatewayResponse {
    /// Whether the model requested tool use this round
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Model gateway trait
///
/// One call sends the full conversation history, the system instruction
/// and the declarations of the tools enabled for this conversation
/// context; the reply is either terminal text or one-or-more tool-call
/// requests to execute before calling again.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        system_instruction: &str,
        tools: &[ToolDeclaration],
    ) -> Result<GatewayResponse, GatewayError>;
}
