//! Appointment store
//!
//! The create path is where the booking collision rule is enforced: a
//! professional's hour bucket (same local day, same starting hour) may hold
//! at most one appointment in a consuming status. Check and insert are a
//! single atomic step so two concurrent bookings cannot both land.

use crate::PersistenceError;
use async_trait::async_trait;
use chrono::{NaiveDate, Timelike, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use clinic_agent_core::{Appointment, AppointmentStatus};

/// Appointment store trait
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Persist a new appointment if its hour bucket is free
    ///
    /// Returns [`PersistenceError::SlotTaken`] when a consuming appointment
    /// already occupies the professional's bucket. The availability check
    /// and the insert must be atomic.
    async fn create(&self, appointment: &Appointment) -> Result<(), PersistenceError>;

    /// Fetch by id
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, PersistenceError>;

    /// Transition an appointment's status
    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<(), PersistenceError>;

    /// All appointments for a professional whose start falls on `date`
    async fn list_for_professional_on(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, PersistenceError>;
}

/// In-memory appointment store
///
/// One mutex over the whole map keeps the bucket check and the insert
/// atomic; the hour-bucket rule matches the availability calculator's
/// coarse `hour()` collision check.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    rows: Mutex<HashMap<Uuid, Appointment>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_taken(rows: &HashMap<Uuid, Appointment>, candidate: &Appointment) -> bool {
        let day = candidate.start_time.date_naive();
        let hour = candidate.start_time.hour();
        rows.values().any(|row| {
            row.professional_id == candidate.professional_id
                && row.status.is_consuming()
                && row.start_time.date_naive() == day
                && row.start_time.hour() == hour
        })
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn create(&self, appointment: &Appointment) -> Result<(), PersistenceError> {
        let mut rows = self.rows.lock();

        if Self::bucket_taken(&rows, appointment) {
            return Err(PersistenceError::SlotTaken {
                professional_id: appointment.professional_id,
                start_time: appointment.start_time,
            });
        }

        rows.insert(appointment.id, appointment.clone());
        drop(rows);

        tracing::info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            start_time = %appointment.start_time,
            status = %appointment.status,
            "Appointment created"
        );

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, PersistenceError> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<(), PersistenceError> {
        let mut rows = self.rows.lock();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(format!("appointment {}", id)))?;

        row.status = status;
        row.updated_at = Utc::now();
        drop(rows);

        tracing::info!(appointment_id = %id, status = %status, "Appointment status updated");
        Ok(())
    }

    async fn list_for_professional_on(
        &self,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, PersistenceError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .lock()
            .values()
            .filter(|row| {
                row.professional_id == professional_id && row.start_time.date_naive() == date
            })
            .cloned()
            .collect();

        rows.sort_by_key(|row| row.start_time);
        Ok(rows)
    }
}
