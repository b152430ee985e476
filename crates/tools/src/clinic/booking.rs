//! Booking tool

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use clinic_agent_core::{InputSchema, PropertySchema, ToolDeclaration};
use clinic_agent_scheduling::{BookingError, BookingOrigin, BookingRequest, BookingService};

use crate::clinic::availability::{parse_uuid, required_str};
use crate::kind::ToolKind;
use crate::tool::{CallerContext, Tool, ToolError, ToolOutput};

/// Books a one-hour appointment for the authenticated caller
///
/// The patient identity always comes from the caller context. The model
/// cannot book on behalf of someone else no matter what arguments it
/// sends.
pub struct BookAppointmentTool {
    booking: Arc<BookingService>,
}

impl BookAppointmentTool {
    pub fn new(booking: Arc<BookingService>) -> Self {
        Self { booking }
    }
}

fn parse_start_time(raw: &str) -> Result<DateTime<Utc>, ToolError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ToolError::invalid_params(format!(
                "start_time must be an RFC 3339 timestamp, got: {}",
                raw
            ))
        })
}

#[async_trait]
impl Tool for BookAppointmentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::BookAppointment
    }

    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: "Book a one-hour appointment with a healthcare professional for the \
                          current patient. The slot must be free; if it was taken in the \
                          meantime, ask the patient to pick another time."
                .to_string(),
            parameters: InputSchema::object()
                .property(
                    "professional_id",
                    PropertySchema::string("UUID of the healthcare professional"),
                    true,
                )
                .property(
                    "start_time",
                    PropertySchema::string(
                        "Appointment start as an RFC 3339 timestamp, e.g. 2026-03-02T10:00:00Z",
                    ),
                    true,
                )
                .property(
                    "notes",
                    PropertySchema::string("Optional note about the reason for the visit"),
                    false,
                ),
        }
    }

    async fn execute(&self, arguments: Value, ctx: &CallerContext) -> Result<ToolOutput, ToolError> {
        let professional_id = parse_uuid(
            required_str(&arguments, "professional_id")?,
            "professional_id",
        )?;
        let start_time = parse_start_time(required_str(&arguments, "start_time")?)?;
        let notes = arguments
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string);

        let origin = if ctx.staff {
            BookingOrigin::Staff
        } else {
            BookingOrigin::Patient
        };

        let appointment = self
            .booking
            .book(BookingRequest {
                professional_id,
                patient_id: ctx.patient_id,
                start_time,
                notes,
                origin,
            })
            .await
            .map_err(|e| match e {
                BookingError::SlotUnavailable { start_time } => ToolError::slot_unavailable(
                    format!("The slot at {} is already taken", start_time),
                ),
                BookingError::InvalidRequest(message) => ToolError::invalid_params(message),
                BookingError::Storage(message) => ToolError::execution(message),
            })?;

        Ok(ToolOutput::json(json!({
            "appointment_id": appointment.id,
            "professional_id": appointment.professional_id,
            "start_time": appointment.start_time.to_rfc3339(),
            "end_time": appointment.end_time.to_rfc3339(),
            "status": appointment.status.as_str(),
        })))
    }
}
