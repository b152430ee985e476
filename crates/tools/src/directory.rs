//! Patient directory integration
//!
//! The "fetch patient data" tool reads through this trait. Implement it
//! against the clinic's real records system; the stub returns mock data
//! for development and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Directory errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Patient not found: {0}")]
    NotFound(Uuid),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A patient's directory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_insurance: Option<String>,
}

/// Patient directory trait
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Fetch a patient's record by id
    async fn fetch(&self, patient_id: Uuid) -> Result<PatientRecord, DirectoryError>;
}

/// Stub directory for development/testing
pub struct StubPatientDirectory;

impl StubPatientDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubPatientDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatientDirectory for StubPatientDirectory {
    async fn fetch(&self, patient_id: Uuid) -> Result<PatientRecord, DirectoryError> {
        tracing::info!(patient_id = %patient_id, "Stub directory: fetch patient");
        Ok(PatientRecord {
            id: patient_id,
            name: "Mock Patient".to_string(),
            phone: "+5511999999999".to_string(),
            email: Some("patient@example.com".to_string()),
            date_of_birth: None,
            health_insurance: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_fetch() {
        let directory = StubPatientDirectory::new();
        let id = Uuid::new_v4();
        let record = directory.fetch(id).await.unwrap();
        assert_eq!(record.id, id);
        assert!(!record.name.is_empty());
    }
}
