//! Professional notification seam
//!
//! Booking confirmations go out after commit as a fire-and-forget task;
//! the trait is implemented against the clinic's real channel (push, SMS)
//! in deployments, and by [`StubNotifier`] in development and tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use clinic_agent_core::Appointment;

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Recipient unknown: {0}")]
    UnknownRecipient(Uuid),
}

/// Notification integration trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify the professional of a newly created appointment
    async fn notify_new_appointment(&self, appointment: &Appointment) -> Result<(), NotifyError>;
}

/// Stub notifier for development/testing
///
/// Logs the notification without contacting any delivery channel.
#[derive(Default)]
pub struct StubNotifier;

impl StubNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify_new_appointment(&self, appointment: &Appointment) -> Result<(), NotifyError> {
        tracing::info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            start_time = %appointment.start_time,
            "Stub notifier: new appointment"
        );
        Ok(())
    }
}
