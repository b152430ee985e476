//! Application state
//!
//! Shared services behind the HTTP handlers. Everything is built once at
//! startup; handlers clone `Arc`s, never the services themselves.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use clinic_agent_agent::{AgentOrchestrator, OrchestratorConfig, SessionManager};
use clinic_agent_config::Settings;
use clinic_agent_llm::{GatewayError, HttpGatewayConfig, HttpModelGateway, ModelGateway};
use clinic_agent_persistence::{
    AppointmentStore, MemoryAppointmentStore, MemoryScheduleStore, ScheduleStore,
};
use clinic_agent_scheduling::{BookingService, StubNotifier};
use clinic_agent_tools::{create_registry, StubPatientDirectory, ToolDependencies, ToolKind};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub booking: Arc<BookingService>,
    /// Tools enabled for new sessions, resolved from config at startup
    pub enabled_tools: HashSet<ToolKind>,
}

impl AppState {
    /// Build the full state with the HTTP model gateway from config
    pub fn new(config: Settings) -> Result<Self, GatewayError> {
        let gateway_config = HttpGatewayConfig::new(&config.gateway.endpoint)
            .with_api_key(&config.gateway.api_key)
            .with_model(&config.gateway.model)
            .with_timeout(Duration::from_secs(config.gateway.timeout_secs));
        let gateway = Arc::new(HttpModelGateway::new(gateway_config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build the state around an externally supplied gateway
    pub fn with_gateway(config: Settings, gateway: Arc<dyn ModelGateway>) -> Self {
        let schedules: Arc<MemoryScheduleStore> = Arc::new(MemoryScheduleStore::new());
        let appointments: Arc<MemoryAppointmentStore> = Arc::new(MemoryAppointmentStore::new());
        let booking = Arc::new(BookingService::new(
            appointments.clone(),
            Arc::new(StubNotifier::new()),
        ));

        let registry = Arc::new(create_registry(ToolDependencies {
            schedules: schedules.clone(),
            appointments: appointments.clone(),
            booking: booking.clone(),
            directory: Arc::new(StubPatientDirectory::new()),
        }));

        let orchestrator = Arc::new(AgentOrchestrator::new(
            gateway,
            registry,
            OrchestratorConfig {
                system_instruction: config.agent.system_instruction.clone(),
                max_tool_rounds: config.agent.max_tool_rounds as usize,
            },
        ));

        let enabled_tools = resolve_enabled_tools(&config.agent.enabled_tools);
        let sessions = Arc::new(SessionManager::new(config.agent.max_sessions));

        Self {
            config: Arc::new(config),
            sessions,
            orchestrator,
            schedules,
            appointments,
            booking,
            enabled_tools,
        }
    }
}

/// Resolve configured tool names; unknown names are logged and skipped
fn resolve_enabled_tools(names: &[String]) -> HashSet<ToolKind> {
    let mut enabled = HashSet::new();
    for name in names {
        match ToolKind::from_name(name) {
            Some(kind) => {
                enabled.insert(kind);
            }
            None => tracing::warn!(tool = %name, "Unknown tool name in config, skipping"),
        }
    }
    enabled
}
