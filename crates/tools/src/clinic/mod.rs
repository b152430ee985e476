//! Clinic tools
//!
//! The three scheduling tools the agent exposes to the model. All of them
//! take caller identity from [`crate::CallerContext`], never from model
//! arguments; a hallucinated `patient_id` in the arguments is ignored.

pub mod availability;
pub mod booking;
pub mod patient;

pub use availability::CheckAvailabilityTool;
pub use booking::BookAppointmentTool;
pub use patient::FetchPatientRecordTool;
