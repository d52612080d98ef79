use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{DoctorError, DoctorRecord, Weekday};
use crate::services::store::DoctorStore;

/// Process-local doctor collection. Insertion order is preserved so that
/// search results come back in store order.
#[derive(Default)]
pub struct InMemoryDoctorStore {
    doctors: RwLock<Vec<DoctorRecord>>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_records(records: Vec<DoctorRecord>) -> Result<Self, DoctorError> {
        let store = Self::new();
        store.insert_many(records).await?;
        Ok(store)
    }

    pub async fn len(&self) -> usize {
        self.doctors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.doctors.read().await.is_empty()
    }
}

#[async_trait]
impl DoctorStore for InMemoryDoctorStore {
    async fn find_by_specialization(&self, pattern: &str) -> Result<Vec<DoctorRecord>, DoctorError> {
        let doctors = self.doctors.read().await;
        let matches: Vec<DoctorRecord> = doctors
            .iter()
            .filter(|doctor| doctor.matches_specialization(pattern))
            .cloned()
            .collect();

        debug!("Found {} doctors matching '{}'", matches.len(), pattern);
        Ok(matches)
    }

    async fn find_by_id(&self, doctor_id: &str) -> Result<Option<DoctorRecord>, DoctorError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|doctor| doctor.doctor_id == doctor_id).cloned())
    }

    async fn pull_slot(&self, doctor_id: &str, day: Weekday, time: &str) -> Result<u64, DoctorError> {
        // Lookup and removal happen under one write guard.
        let mut doctors = self.doctors.write().await;
        let modified = doctors
            .iter_mut()
            .find(|doctor| doctor.doctor_id == doctor_id)
            .map(|doctor| doctor.weekly_schedule.remove_slot(day, time))
            .unwrap_or(false);

        if modified {
            info!("Removed slot {} {} for doctor {}", day, time, doctor_id);
        } else {
            debug!("No slot {} {} for doctor {}", day, time, doctor_id);
        }

        Ok(u64::from(modified))
    }

    async fn insert_many(&self, records: Vec<DoctorRecord>) -> Result<Vec<String>, DoctorError> {
        let mut doctors = self.doctors.write().await;

        for (index, record) in records.iter().enumerate() {
            let clashes_with_store = doctors.iter().any(|d| d.doctor_id == record.doctor_id);
            let clashes_with_batch = records[..index].iter().any(|d| d.doctor_id == record.doctor_id);
            if clashes_with_store || clashes_with_batch {
                return Err(DoctorError::DuplicateId(record.doctor_id.clone()));
            }
        }

        let mut inserted_ids = Vec::with_capacity(records.len());
        for mut record in records {
            record.weekly_schedule.dedup_slots();
            inserted_ids.push(record.doctor_id.clone());
            doctors.push(record);
        }

        info!("Inserted {} doctor records", inserted_ids.len());
        Ok(inserted_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use assert_matches::assert_matches;

    use crate::models::WeeklySchedule;

    fn doctor(id: &str, specialization: &str) -> DoctorRecord {
        let schedule: WeeklySchedule = [(Weekday::Monday, vec!["10:00".to_string(), "11:00".to_string()])]
            .into_iter()
            .collect();
        DoctorRecord::new(id, format!("Dr. {}", id), specialization, 4.0, 5).with_schedule(schedule)
    }

    #[tokio::test]
    async fn find_matches_substring_ignoring_case() {
        let store = InMemoryDoctorStore::with_records(vec![
            doctor("D1", "Cardiology"),
            doctor("D2", "Dermatology"),
            doctor("D3", "Interventional Cardiology"),
        ])
        .await
        .unwrap();

        let found = store.find_by_specialization("cardio").await.unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.doctor_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D3"]);
    }

    #[tokio::test]
    async fn short_patterns_match_inside_longer_names() {
        let store = InMemoryDoctorStore::with_records(vec![
            doctor("D1", "ENT"),
            doctor("D2", "Interventional Cardiology"),
            doctor("D3", "Neurology"),
        ])
        .await
        .unwrap();

        let found = store.find_by_specialization("ent").await.unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.doctor_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D2"]);
    }

    #[tokio::test]
    async fn pull_slot_is_at_most_once() {
        let store = InMemoryDoctorStore::with_records(vec![doctor("D1", "Cardiology")]).await.unwrap();

        assert_eq!(store.pull_slot("D1", Weekday::Monday, "10:00").await.unwrap(), 1);
        assert_eq!(store.pull_slot("D1", Weekday::Monday, "10:00").await.unwrap(), 0);
        assert_eq!(store.pull_slot("D9", Weekday::Monday, "11:00").await.unwrap(), 0);

        let remaining = store.find_by_id("D1").await.unwrap().unwrap();
        assert_eq!(remaining.weekly_schedule.slots(Weekday::Monday), ["11:00"]);
    }

    #[tokio::test]
    async fn concurrent_pulls_of_one_slot_succeed_once() {
        let store = Arc::new(InMemoryDoctorStore::with_records(vec![doctor("D1", "Cardiology")]).await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.pull_slot("D1", Weekday::Monday, "10:00").await.unwrap() })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn insert_many_rejects_duplicate_ids() {
        let store = InMemoryDoctorStore::with_records(vec![doctor("D1", "Cardiology")]).await.unwrap();

        let result = store.insert_many(vec![doctor("D2", "ENT"), doctor("D1", "ENT")]).await;
        assert_matches!(result, Err(DoctorError::DuplicateId(id)) if id == "D1");
        assert_eq!(store.len().await, 1);

        let result = store.insert_many(vec![doctor("D5", "ENT"), doctor("D5", "ENT")]).await;
        assert_matches!(result, Err(DoctorError::DuplicateId(_)));
    }
}
