use async_trait::async_trait;

use crate::models::{DoctorError, DoctorRecord, Weekday};

/// Document-store contract the rest of the system is written against.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    /// Case-insensitive substring match on `primary_specialization`, in store order.
    async fn find_by_specialization(&self, pattern: &str) -> Result<Vec<DoctorRecord>, DoctorError>;

    async fn find_by_id(&self, doctor_id: &str) -> Result<Option<DoctorRecord>, DoctorError>;

    /// Removes `time` from the doctor's `day` slots in one conditional update.
    /// Returns the number of documents modified (0 or 1).
    async fn pull_slot(&self, doctor_id: &str, day: Weekday, time: &str) -> Result<u64, DoctorError>;

    /// Bulk load. Returns the inserted ids in input order.
    async fn insert_many(&self, records: Vec<DoctorRecord>) -> Result<Vec<String>, DoctorError>;
}
