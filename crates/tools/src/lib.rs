//! Tools for the clinic agent
//!
//! The model only ever reaches side effects through this crate: every
//! tool declares a parameter contract, arguments are validated before
//! execution, execution is bounded by a timeout, and authorization-
//! sensitive parameters come from the authenticated caller context,
//! never from model-supplied arguments.

pub mod clinic;
pub mod directory;
pub mod kind;
pub mod registry;
pub mod tool;

pub use clinic::{BookAppointmentTool, CheckAvailabilityTool, FetchPatientRecordTool};
pub use directory::{DirectoryError, PatientDirectory, PatientRecord, StubPatientDirectory};
pub use kind::ToolKind;
pub use registry::{create_registry, ToolDependencies, ToolRegistry};
pub use tool::{CallerContext, Tool, ToolError, ToolOutput};
