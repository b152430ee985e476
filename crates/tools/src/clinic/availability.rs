//! Availability lookup tool

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use clinic_agent_core::{InputSchema, PropertySchema, ToolDeclaration};
use clinic_agent_persistence::{AppointmentStore, ScheduleStore};
use clinic_agent_scheduling::{compute_slots, BookedSpan};

use crate::kind::ToolKind;
use crate::tool::{CallerContext, Tool, ToolError, ToolOutput};

/// Lists a professional's free one-hour slots on a given date
pub struct CheckAvailabilityTool {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl CheckAvailabilityTool {
    pub fn new(schedules: Arc<dyn ScheduleStore>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            schedules,
            appointments,
        }
    }
}

/// Accepts the date spellings models actually produce
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ToolError> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            ToolError::invalid_params(format!("date must be YYYY-MM-DD, got: {}", raw))
        })
}

pub(crate) fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params(format!("{} is required", name)))
}

pub(crate) fn parse_uuid(raw: &str, name: &str) -> Result<Uuid, ToolError> {
    Uuid::parse_str(raw)
        .map_err(|_| ToolError::invalid_params(format!("{} must be a UUID, got: {}", name, raw)))
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn kind(&self) -> ToolKind {
        ToolKind::CheckAvailability
    }

    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: "List a healthcare professional's free one-hour appointment slots \
                          on a given date. Each slot is the start of a whole hour."
                .to_string(),
            parameters: InputSchema::object()
                .property(
                    "professional_id",
                    PropertySchema::string("UUID of the healthcare professional"),
                    true,
                )
                .property(
                    "date",
                    PropertySchema::string("Date to check, formatted YYYY-MM-DD"),
                    true,
                ),
        }
    }

    async fn execute(
        &self,
        arguments: Value,
        _ctx: &CallerContext,
    ) -> Result<ToolOutput, ToolError> {
        let professional_id = parse_uuid(
            required_str(&arguments, "professional_id")?,
            "professional_id",
        )?;
        let date = parse_date(required_str(&arguments, "date")?)?;

        let stored = self
            .schedules
            .get(professional_id)
            .await
            .map_err(|e| ToolError::execution(e.to_string()))?
            .ok_or_else(|| {
                ToolError::execution(format!(
                    "professional {} has no operating schedule",
                    professional_id
                ))
            })?;
        let schedule = stored.resolve();

        let booked: Vec<BookedSpan> = self
            .appointments
            .list_for_professional_on(professional_id, date)
            .await
            .map_err(|e| ToolError::execution(e.to_string()))?
            .iter()
            .filter(|a| a.status.is_consuming())
            .map(|a| BookedSpan::new(a.start_time, a.end_time))
            .collect();

        let slots = compute_slots(&schedule, date, &booked);

        tracing::debug!(
            professional_id = %professional_id,
            date = %date,
            free = slots.len(),
            "Computed availability"
        );

        Ok(ToolOutput::json(json!({
            "professional_id": professional_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "slots": slots.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        })))
    }
}
