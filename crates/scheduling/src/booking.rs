//! Booking service
//!
//! Sole writer of appointment rows. Duration is fixed at one hour; the
//! hour-bucket uniqueness check happens inside the store's create, so two
//! concurrent bookings for the same professional/hour cannot both succeed
//! even when both saw the slot free.

use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use thiserror::Error;
use uuid::Uuid;

use clinic_agent_core::{Appointment, AppointmentStatus};
use clinic_agent_persistence::{AppointmentStore, PersistenceError};

use crate::notify::Notifier;

/// Booking errors
#[derive(Error, Debug)]
pub enum BookingError {
    /// Expected contention outcome: the hour bucket is already occupied.
    /// Recoverable; callers prompt for a different slot.
    #[error("Slot {start_time} is no longer available")]
    SlotUnavailable { start_time: DateTime<Utc> },

    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<PersistenceError> for BookingError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::SlotTaken { start_time, .. } => {
                BookingError::SlotUnavailable { start_time }
            }
            other => BookingError::Storage(other.to_string()),
        }
    }
}

/// Who initiated the booking; decides the created status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOrigin {
    /// Patient-initiated: awaits the professional's approval
    Patient,
    /// Staff-initiated, or agent booking for a pre-approving professional
    Staff,
}

impl BookingOrigin {
    pub fn initial_status(&self) -> AppointmentStatus {
        match self {
            BookingOrigin::Patient => AppointmentStatus::PendingApproval,
            BookingOrigin::Staff => AppointmentStatus::Scheduled,
        }
    }
}

/// A validated booking request
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub origin: BookingOrigin,
}

/// Booking service
pub struct BookingService {
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    pub fn new(store: Arc<dyn AppointmentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Book a one-hour appointment
    ///
    /// On success the appointment is committed before the notification is
    /// spawned; a notification failure is logged and never rolls back or
    /// fails the booking.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, BookingError> {
        // Slots live on a one-hour grid; the store's uniqueness check keys
        // on the hour bucket, so off-hour starts are rejected up front.
        if request.start_time.minute() != 0 || request.start_time.second() != 0 {
            return Err(BookingError::InvalidRequest(format!(
                "start time {} must fall on a whole hour",
                request.start_time
            )));
        }

        let appointment = Appointment::new(
            request.professional_id,
            request.patient_id,
            request.start_time,
            request.origin.initial_status(),
            request.notes,
        );

        self.store.create(&appointment).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            patient_id = %appointment.patient_id,
            start_time = %appointment.start_time,
            status = %appointment.status,
            "Appointment booked"
        );

        let notifier = self.notifier.clone();
        let committed = appointment.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_new_appointment(&committed).await {
                tracing::warn!(
                    appointment_id = %committed.id,
                    error = %e,
                    "Appointment notification failed"
                );
            }
        });

        Ok(appointment)
    }
}
