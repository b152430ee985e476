//! Patient record tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use clinic_agent_core::{InputSchema, ToolDeclaration};

use crate::directory::{DirectoryError, PatientDirectory};
use crate::kind::ToolKind;
use crate::tool::{CallerContext, Tool, ToolError, ToolOutput};

/// Fetches the caller's own patient record from the directory
///
/// Takes no arguments: the record looked up is always the authenticated
/// caller's, so the model cannot read other patients' data.
pub struct FetchPatientRecordTool {
    directory: Arc<dyn PatientDirectory>,
}

impl FetchPatientRecordTool {
    pub fn new(directory: Arc<dyn PatientDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for FetchPatientRecordTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FetchPatientRecord
    }

    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: "Fetch the current patient's registration record: name, contact \
                          details and health insurance. Use it to confirm details before \
                          booking."
                .to_string(),
            parameters: InputSchema::object(),
        }
    }

    async fn execute(
        &self,
        _arguments: Value,
        ctx: &CallerContext,
    ) -> Result<ToolOutput, ToolError> {
        let record = self
            .directory
            .fetch(ctx.patient_id)
            .await
            .map_err(|e| match e {
                DirectoryError::NotFound(_) => {
                    ToolError::execution(format!("patient record not found: {}", ctx.patient_id))
                }
                other => ToolError::execution(other.to_string()),
            })?;

        let value = serde_json::to_value(&record)
            .map_err(|e| ToolError::execution(format!("record serialization failed: {}", e)))?;
        Ok(ToolOutput::json(value))
    }
}
