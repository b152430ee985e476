//! Agent orchestrator
//!
//! One `converse` call handles one user message end to end: gateway
//! round, tool execution, results fed back, repeat until the model
//! answers in text. Tool failures are reported back to the model as
//! error results rather than aborting the turn; only gateway failures
//! and round-allowance violations surface as errors.

use std::collections::HashSet;
use std::sync::Arc;

use clinic_agent_core::{ConversationTurn, ToolResult};
use clinic_agent_llm::ModelGateway;
use clinic_agent_tools::{CallerContext, ToolKind, ToolRegistry};

use crate::session::ChatSession;
use crate::AgentError;

/// Loop limits and prompt for one orchestrator instance
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// System instruction sent on every gateway call
    pub system_instruction: String,
    /// Tool rounds allowed per user message before the turn is aborted
    pub max_tool_rounds: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_instruction: String::new(),
            max_tool_rounds: 2,
        }
    }
}

/// Drives the model/tool loop for chat sessions
pub struct AgentOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl AgentOrchestrator {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            config,
        }
    }

    /// Process one user message and return the assistant's text reply
    ///
    /// Appends the user turn, then alternates gateway calls and tool
    /// rounds. Each tool round appends one assistant turn holding the
    /// requested calls and one tool turn holding the results in the same
    /// order. A turn that is still requesting tools after
    /// `max_tool_rounds` rounds fails with
    /// [`AgentError::ProtocolViolation`]; the session keeps the partial
    /// history so the exchange stays auditable.
    pub async fn converse(
        &self,
        session: &mut ChatSession,
        message: impl Into<String>,
    ) -> Result<String, AgentError> {
        session.history.push(ConversationTurn::user(message));

        let declarations = self.registry.declarations(&session.enabled_tools);
        let mut rounds_used = 0usize;

        loop {
            let response = self
                .gateway
                .generate(
                    &session.history,
                    &self.config.system_instruction,
                    &declarations,
                )
                .await?;

            if !response.has_tool_calls() {
                let reply = response.text.unwrap_or_default();
                session
                    .history
                    .push(ConversationTurn::assistant_text(reply.clone()));
                tracing::debug!(
                    session_id = %session.id,
                    rounds_used,
                    "Turn completed"
                );
                return Ok(reply);
            }

            if rounds_used >= self.config.max_tool_rounds {
                tracing::warn!(
                    session_id = %session.id,
                    max_rounds = self.config.max_tool_rounds,
                    "Model still requesting tools past the round allowance"
                );
                return Err(AgentError::ProtocolViolation {
                    max_rounds: self.config.max_tool_rounds,
                });
            }
            rounds_used += 1;

            let calls = response.tool_calls;
            tracing::debug!(
                session_id = %session.id,
                round = rounds_used,
                calls = calls.len(),
                "Executing tool round"
            );
            session
                .history
                .push(ConversationTurn::assistant_calls(calls.clone()));

            let results = self
                .run_tool_round(&calls, &session.caller, &session.enabled_tools)
                .await;
            session.history.push(ConversationTurn::tool_results(results));
        }
    }

    /// Execute one batch of calls sequentially, preserving request order
    ///
    /// The calls in a batch are treated as independent: one failing call
    /// becomes an error result in its slot and the rest still run.
    async fn run_tool_round(
        &self,
        calls: &[clinic_agent_core::ToolCallRequest],
        caller: &CallerContext,
        enabled: &HashSet<ToolKind>,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.registry.execute(call, caller, enabled).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clinic_agent_core::{ToolCallRequest, ToolResultPayload, TurnRole};
    use clinic_agent_llm::{GatewayError, GatewayResponse};
    use clinic_agent_persistence::{MemoryAppointmentStore, MemoryScheduleStore};
    use clinic_agent_scheduling::{BookingService, StubNotifier};
    use clinic_agent_tools::{create_registry, StubPatientDirectory, ToolDependencies};
    use clinic_agent_core::ToolDeclaration;
    use parking_lot::Mutex;
    use uuid::Uuid;

    /// Gateway that replays a fixed script of responses
    struct ScriptedGateway {
        script: Mutex<Vec<GatewayResponse>>,
        calls_seen: Mutex<usize>,
    }

    impl ScriptedGateway {
        fn new(mut script: Vec<GatewayResponse>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls_seen: Mutex::new(0),
            }
        }

        fn calls_seen(&self) -> usize {
            *self.calls_seen.lock()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn generate(
            &self,
            _history: &[ConversationTurn],
            _system_instruction: &str,
            _tools: &[ToolDeclaration],
        ) -> Result<GatewayResponse, GatewayError> {
            *self.calls_seen.lock() += 1;
            self.script
                .lock()
                .pop()
                .ok_or_else(|| GatewayError::InvalidResponse("script exhausted".to_string()))
        }
    }

    fn text_response(text: &str) -> GatewayResponse {
        GatewayResponse {
            text: Some(text.to_string()),
            tool_calls: Vec::new(),
        }
    }

    fn call_response(calls: Vec<ToolCallRequest>) -> GatewayResponse {
        GatewayResponse {
            text: None,
            tool_calls: calls,
        }
    }

    fn fetch_call() -> ToolCallRequest {
        ToolCallRequest::new("fetch_patient_record", serde_json::Map::new())
    }

    fn registry() -> Arc<ToolRegistry> {
        let appointments = Arc::new(MemoryAppointmentStore::new());
        let booking = Arc::new(BookingService::new(
            appointments.clone(),
            Arc::new(StubNotifier::new()),
        ));
        Arc::new(create_registry(ToolDependencies {
            schedules: Arc::new(MemoryScheduleStore::new()),
            appointments,
            booking,
            directory: Arc::new(StubPatientDirectory::new()),
        }))
    }

    fn session() -> ChatSession {
        ChatSession::new(
            CallerContext::patient(Uuid::new_v4(), Uuid::new_v4()),
            ToolKind::all().into_iter().collect(),
        )
    }

    fn orchestrator(gateway: Arc<ScriptedGateway>) -> AgentOrchestrator {
        AgentOrchestrator::new(
            gateway,
            registry(),
            OrchestratorConfig {
                system_instruction: "You are the clinic's scheduling assistant".to_string(),
                max_tool_rounds: 2,
            },
        )
    }

    #[tokio::test]
    async fn test_plain_text_turn() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("Hello!")]));
        let agent = orchestrator(gateway.clone());
        let mut session = session();

        let reply = agent.converse(&mut session, "hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        assert_eq!(gateway.calls_seen(), 1);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, TurnRole::User);
        assert_eq!(session.history[1].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn test_tool_round_then_text() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            call_response(vec![fetch_call(), fetch_call()]),
            text_response("You are registered as Mock Patient."),
        ]));
        let agent = orchestrator(gateway.clone());
        let mut session = session();

        let reply = agent.converse(&mut session, "who am I?").await.unwrap();

        assert_eq!(reply, "You are registered as Mock Patient.");
        assert_eq!(gateway.calls_seen(), 2);
        // user, assistant calls, tool results, assistant text
        assert_eq!(session.history.len(), 4);
        assert_eq!(session.history[1].role, TurnRole::Assistant);
        assert_eq!(session.history[1].tool_calls().len(), 2);
        assert_eq!(session.history[2].role, TurnRole::Tool);
    }

    #[tokio::test]
    async fn test_failed_call_reported_back_and_turn_completes() {
        let bad_call = ToolCallRequest::new("update_patient_record", serde_json::Map::new());
        let gateway = Arc::new(ScriptedGateway::new(vec![
            call_response(vec![bad_call, fetch_call()]),
            text_response("Sorry, let me try that differently."),
        ]));
        let agent = orchestrator(gateway);
        let mut session = session();

        let reply = agent.converse(&mut session, "update my file").await.unwrap();
        assert_eq!(reply, "Sorry, let me try that differently.");

        // Both results recorded in call order: an error, then a success
        let results: Vec<_> = session.history[2]
            .parts
            .iter()
            .filter_map(|p| match p {
                clinic_agent_core::TurnPart::ToolResult(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(results.len(), 2);
        assert!(!results[0].payload.is_success());
        assert!(results[1].payload.is_success());
    }

    #[tokio::test]
    async fn test_disabled_tool_still_completes_turn() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            call_response(vec![ToolCallRequest::new(
                "book_appointment",
                serde_json::Map::new(),
            )]),
            text_response("Booking is unavailable right now."),
        ]));
        let agent = orchestrator(gateway);
        let mut session = ChatSession::new(
            CallerContext::patient(Uuid::new_v4(), Uuid::new_v4()),
            [ToolKind::CheckAvailability].into_iter().collect(),
        );

        let reply = agent.converse(&mut session, "book me in").await.unwrap();
        assert_eq!(reply, "Booking is unavailable right now.");

        match &session.history[2].parts[0] {
            clinic_agent_core::TurnPart::ToolResult(result) => {
                assert!(matches!(result.payload, ToolResultPayload::Error { .. }));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_endless_tool_requests_hit_round_allowance() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            call_response(vec![fetch_call()]),
            call_response(vec![fetch_call()]),
            call_response(vec![fetch_call()]),
            text_response("never reached"),
        ]));
        let agent = orchestrator(gateway.clone());
        let mut session = session();

        let err = agent.converse(&mut session, "loop forever").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ProtocolViolation { max_rounds: 2 }
        ));
        // Two tool rounds executed, the third response aborts the turn
        assert_eq!(gateway.calls_seen(), 3);
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let agent = orchestrator(gateway);
        let mut session = session();

        let err = agent.converse(&mut session, "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_tool_declarations_respect_enabled_set() {
        // check_availability alone enabled: fetch_patient_record is rejected
        let gateway = Arc::new(ScriptedGateway::new(vec![
            call_response(vec![fetch_call()]),
            text_response("done"),
        ]));
        let agent = orchestrator(gateway);
        let mut session = ChatSession::new(
            CallerContext::patient(Uuid::new_v4(), Uuid::new_v4()),
            [ToolKind::CheckAvailability].into_iter().collect(),
        );

        agent.converse(&mut session, "who am I?").await.unwrap();
        match &session.history[2].parts[0] {
            clinic_agent_core::TurnPart::ToolResult(result) => {
                assert!(!result.payload.is_success());
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }
}
