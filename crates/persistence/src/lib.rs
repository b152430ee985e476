//! Persistence layer for the clinic agent
//!
//! Stores for the two entities the scheduler needs: appointments and
//! per-professional operating schedules. The appointment store enforces
//! one consuming appointment per professional/hour bucket at the point of
//! commit, not only pre-flight; the in-memory implementations keep that
//! guarantee under a single lock and leave the traits as the seam for a
//! real database.

pub mod appointments;
pub mod schedules;

pub use appointments::{AppointmentStore, MemoryAppointmentStore};
pub use schedules::{MemoryScheduleStore, ScheduleStore};

use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The professional's hour bucket already holds a consuming appointment
    #[error("Slot already taken for professional {professional_id} at {start_time}")]
    SlotTaken {
        professional_id: uuid::Uuid,
        start_time: chrono::DateTime<chrono::Utc>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
