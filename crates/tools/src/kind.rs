//! Typed tool identifiers
//!
//! Dispatch is over this enumeration rather than raw strings: adding a
//! tool is a compile-time-checked change, and an unknown name falls
//! through to a validation error instead of a crash.

use serde::{Deserialize, Serialize};

/// The tools this agent can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Compute open slots for a professional on a date
    CheckAvailability,
    /// Book a one-hour appointment for the authenticated patient
    BookAppointment,
    /// Fetch the authenticated patient's record
    FetchPatientRecord,
}

impl ToolKind {
    /// Declared tool name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckAvailability => "check_availability",
            Self::BookAppointment => "book_appointment",
            Self::FetchPatientRecord => "fetch_patient_record",
        }
    }

    /// Resolve a wire name; `None` is the explicit unknown-tool fallthrough
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "check_availability" => Some(Self::CheckAvailability),
            "book_appointment" => Some(Self::BookAppointment),
            "fetch_patient_record" => Some(Self::FetchPatientRecord),
            _ => None,
        }
    }

    /// All known kinds
    pub fn all() -> [ToolKind; 3] {
        [
            Self::CheckAvailability,
            Self::BookAppointment,
            Self::FetchPatientRecord,
        ]
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
