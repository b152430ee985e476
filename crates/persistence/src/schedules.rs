//! Operating-schedule store
//!
//! Rows are kept in their stored form ([`StoredSchedule`], weekly or
//! legacy); callers resolve to a normalized week once at load time.

use crate::PersistenceError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use clinic_agent_core::StoredSchedule;

/// Schedule store trait
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Stored schedule for a professional, if any
    async fn get(&self, professional_id: Uuid) -> Result<Option<StoredSchedule>, PersistenceError>;

    /// Insert or replace a professional's schedule
    async fn upsert(
        &self,
        professional_id: Uuid,
        schedule: StoredSchedule,
    ) -> Result<(), PersistenceError>;
}

/// In-memory schedule store
#[derive(Default)]
pub struct MemoryScheduleStore {
    rows: RwLock<HashMap<Uuid, StoredSchedule>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn get(&self, professional_id: Uuid) -> Result<Option<StoredSchedule>, PersistenceError> {
        Ok(self.rows.read().get(&professional_id).cloned())
    }

    async fn upsert(
        &self,
        professional_id: Uuid,
        schedule: StoredSchedule,
    ) -> Result<(), PersistenceError> {
        self.rows.write().insert(professional_id, schedule);
        tracing::debug!(professional_id = %professional_id, "Schedule upserted");
        Ok(())
    }
}
