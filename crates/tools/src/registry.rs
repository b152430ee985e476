//! Tool registry
//!
//! Resolves names through [`ToolKind`], validates arguments against each
//! tool's declared contract, runs the tool under its timeout, and maps
//! every failure into a [`ToolResult`] error payload. Execution never
//! crashes the caller; the orchestrator forwards whatever comes back to
//! the model.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use clinic_agent_core::{InputSchema, ToolCallRequest, ToolDeclaration, ToolErrorKind, ToolResult};
use clinic_agent_persistence::{AppointmentStore, ScheduleStore};
use clinic_agent_scheduling::BookingService;

use crate::clinic::{BookAppointmentTool, CheckAvailabilityTool, FetchPatientRecordTool};
use crate::directory::PatientDirectory;
use crate::kind::ToolKind;
use crate::tool::{CallerContext, Tool, ToolError};

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under its kind
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.kind(), Arc::new(tool));
    }

    /// Check if a tool is registered
    pub fn has(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations of the enabled tools only, in a stable order
    pub fn declarations(&self, enabled: &HashSet<ToolKind>) -> Vec<ToolDeclaration> {
        ToolKind::all()
            .iter()
            .filter(|kind| enabled.contains(kind))
            .filter_map(|kind| self.tools.get(kind))
            .map(|tool| tool.declaration())
            .collect()
    }

    /// Execute one model-requested tool call
    ///
    /// Unknown names, disabled tools, contract violations, timeouts and
    /// execution failures all come back as error-payload results; the
    /// sibling calls of a batch are unaffected.
    pub async fn execute(
        &self,
        request: &ToolCallRequest,
        ctx: &CallerContext,
        enabled: &HashSet<ToolKind>,
    ) -> ToolResult {
        let kind = match ToolKind::from_name(&request.name) {
            Some(kind) => kind,
            None => {
                tracing::warn!(tool = %request.name, "Unknown tool requested by model");
                return ToolResult::error(
                    &request.name,
                    ToolErrorKind::Validation,
                    format!("Unknown tool: {}", request.name),
                );
            }
        };

        if !enabled.contains(&kind) {
            tracing::warn!(tool = %kind, "Disabled tool requested by model");
            return ToolResult::error(
                kind.name(),
                ToolErrorKind::Validation,
                format!("Tool not enabled in this conversation: {}", kind),
            );
        }

        let tool = match self.tools.get(&kind) {
            Some(tool) => tool.clone(),
            None => {
                return ToolResult::error(
                    kind.name(),
                    ToolErrorKind::Execution,
                    format!("Tool not registered: {}", kind),
                );
            }
        };

        let arguments = Value::Object(request.arguments.clone());
        if let Err(e) = validate_arguments(&tool.declaration().parameters, &request.arguments) {
            return ToolResult::error(kind.name(), e.kind(), e.to_string());
        }

        let timeout_secs = tool.timeout_secs();
        tracing::debug!(tool = %kind, timeout_secs, "Executing tool");

        let outcome = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            tool.execute(arguments, ctx),
        )
        .await;

        match outcome {
            Ok(Ok(output)) => ToolResult::success(kind.name(), output.value),
            Ok(Err(e)) => {
                tracing::warn!(tool = %kind, error = %e, "Tool execution failed");
                ToolResult::error(kind.name(), e.kind(), e.to_string())
            }
            Err(_elapsed) => {
                let e = ToolError::timeout(kind.name(), timeout_secs);
                tracing::warn!(tool = %kind, timeout_secs, "Tool execution timed out");
                ToolResult::error(kind.name(), e.kind(), e.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate arguments against a declared contract
///
/// Required parameters must be present and every declared parameter that
/// is present must match its declared JSON type. Undeclared extra keys
/// are ignored; tools already ignore identity fields by design.
fn validate_arguments(
    schema: &InputSchema,
    arguments: &serde_json::Map<String, Value>,
) -> Result<(), ToolError> {
    for name in &schema.required {
        match arguments.get(name) {
            None | Some(Value::Null) => {
                return Err(ToolError::invalid_params(format!(
                    "{} is required",
                    name
                )));
            }
            Some(_) => {}
        }
    }

    for (name, value) in arguments {
        let Some(expected) = schema.property_type(name) else {
            continue;
        };
        let matches = match expected {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            _ => true,
        };
        if !matches {
            return Err(ToolError::invalid_params(format!(
                "{} must be of type {}",
                name, expected
            )));
        }
    }

    Ok(())
}

/// Shared services the clinic tools execute against
#[derive(Clone)]
pub struct ToolDependencies {
    pub schedules: Arc<dyn ScheduleStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub booking: Arc<BookingService>,
    pub directory: Arc<dyn PatientDirectory>,
}

/// Create a registry with all clinic tools wired to their services
pub fn create_registry(deps: ToolDependencies) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(CheckAvailabilityTool::new(
        deps.schedules.clone(),
        deps.appointments.clone(),
    ));
    registry.register(BookAppointmentTool::new(deps.booking.clone()));
    registry.register(FetchPatientRecordTool::new(deps.directory.clone()));

    tracing::info!(tools = registry.len(), "Created tool registry");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StubPatientDirectory;
    use clinic_agent_core::{PropertySchema, ToolErrorKind, ToolResultPayload};
    use clinic_agent_persistence::{MemoryAppointmentStore, MemoryScheduleStore};
    use clinic_agent_scheduling::StubNotifier;
    use serde_json::json;
    use uuid::Uuid;

    fn test_registry() -> ToolRegistry {
        let appointments = Arc::new(MemoryAppointmentStore::new());
        let booking = Arc::new(BookingService::new(
            appointments.clone(),
            Arc::new(StubNotifier::new()),
        ));
        create_registry(ToolDependencies {
            schedules: Arc::new(MemoryScheduleStore::new()),
            appointments,
            booking,
            directory: Arc::new(StubPatientDirectory::new()),
        })
    }

    fn all_enabled() -> HashSet<ToolKind> {
        ToolKind::all().into_iter().collect()
    }

    fn ctx() -> CallerContext {
        CallerContext::patient(Uuid::new_v4(), Uuid::new_v4())
    }

    fn call(name: &str, args: Value) -> ToolCallRequest {
        let arguments = match args {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        ToolCallRequest::new(name, arguments)
    }

    fn error_kind(result: &ToolResult) -> Option<ToolErrorKind> {
        match &result.payload {
            ToolResultPayload::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    #[test]
    fn test_registry_has_all_clinic_tools() {
        let registry = test_registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.has(ToolKind::CheckAvailability));
        assert!(registry.has(ToolKind::BookAppointment));
        assert!(registry.has(ToolKind::FetchPatientRecord));
    }

    #[test]
    fn test_declarations_filtered_by_enabled_set() {
        let registry = test_registry();
        let only_availability: HashSet<_> = [ToolKind::CheckAvailability].into();
        let declarations = registry.declarations(&only_availability);
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "check_availability");

        assert_eq!(registry.declarations(&all_enabled()).len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_validation_error() {
        let registry = test_registry();
        let result = registry
            .execute(&call("drop_tables", json!({})), &ctx(), &all_enabled())
            .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_disabled_tool_is_validation_error() {
        let registry = test_registry();
        let only_availability: HashSet<_> = [ToolKind::CheckAvailability].into();
        let result = registry
            .execute(
                &call("book_appointment", json!({"professional_id": "x", "start_time": "y"})),
                &ctx(),
                &only_availability,
            )
            .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::Validation));
        assert_eq!(result.name, "book_appointment");
    }

    #[tokio::test]
    async fn test_missing_required_argument_rejected() {
        let registry = test_registry();
        let result = registry
            .execute(
                &call("check_availability", json!({"date": "2026-03-02"})),
                &ctx(),
                &all_enabled(),
            )
            .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_wrong_argument_type_rejected() {
        let registry = test_registry();
        let result = registry
            .execute(
                &call(
                    "check_availability",
                    json!({"professional_id": 42, "date": "2026-03-02"}),
                ),
                &ctx(),
                &all_enabled(),
            )
            .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::Validation));
    }

    #[test]
    fn test_validate_arguments_ignores_extra_keys() {
        let schema = InputSchema::object().property(
            "date",
            PropertySchema::string("Date"),
            true,
        );
        let mut args = serde_json::Map::new();
        args.insert("date".to_string(), json!("2026-03-02"));
        args.insert("patient_id".to_string(), json!("hallucinated"));
        assert!(validate_arguments(&schema, &args).is_ok());
    }

    struct SlowTool;

    #[async_trait::async_trait]
    impl Tool for SlowTool {
        fn kind(&self) -> ToolKind {
            ToolKind::FetchPatientRecord
        }

        fn declaration(&self) -> ToolDeclaration {
            ToolDeclaration {
                name: self.name().to_string(),
                description: "slow".to_string(),
                parameters: InputSchema::object(),
            }
        }

        async fn execute(
            &self,
            _arguments: Value,
            _ctx: &CallerContext,
        ) -> Result<crate::tool::ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(crate::tool::ToolOutput::json(json!({})))
        }

        fn timeout_secs(&self) -> u64 {
            1
        }
    }

    #[tokio::test]
    async fn test_timeout_becomes_execution_error() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);

        let result = registry
            .execute(&call("fetch_patient_record", json!({})), &ctx(), &all_enabled())
            .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::Execution));
    }
}
