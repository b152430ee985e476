//! Core types for the clinic agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation turns and parts (append-only history)
//! - Tool call/result contracts and tool declarations
//! - Appointment and operating-schedule data model
//!
//! It performs no I/O and has no async dependencies.

pub mod appointment;
pub mod conversation;
pub mod schedule;
pub mod tooling;

pub use appointment::{Appointment, AppointmentStatus};
pub use conversation::{ConversationTurn, TurnPart, TurnRole};
pub use schedule::{DayHours, OperatingSchedule, Slot, StoredSchedule};
pub use tooling::{
    InputSchema, PropertySchema, ToolCallRequest, ToolDeclaration, ToolErrorKind, ToolResult,
    ToolResultPayload,
};
