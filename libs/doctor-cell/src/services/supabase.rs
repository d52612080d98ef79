use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorError, DoctorRecord, Weekday};
use crate::services::store::DoctorStore;

const DOCTORS_TABLE: &str = "doctors";
const PULL_SLOT_FUNCTION: &str = "pull_schedule_slot";

/// Doctor collection kept in the Supabase `doctors` table, with
/// `weekly_schedule` stored as `jsonb`. Slot removal goes through the
/// `pull_schedule_slot` function (see `sql/pull_schedule_slot.sql`).
pub struct SupabaseDoctorStore {
    supabase: SupabaseClient,
}

impl SupabaseDoctorStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

fn store_error(e: anyhow::Error) -> DoctorError {
    error!("Supabase doctor store failure: {}", e);
    DoctorError::Store(e.to_string())
}

#[async_trait]
impl DoctorStore for SupabaseDoctorStore {
    async fn find_by_specialization(&self, pattern: &str) -> Result<Vec<DoctorRecord>, DoctorError> {
        debug!("Querying doctors with specialization like '{}'", pattern);

        let filters = [
            ("primary_specialization", format!("ilike.%{}%", pattern.trim())),
            ("order", "doctor_id.asc".to_string()),
        ];

        self.supabase
            .select::<DoctorRecord>(DOCTORS_TABLE, &filters)
            .await
            .map_err(store_error)
    }

    async fn find_by_id(&self, doctor_id: &str) -> Result<Option<DoctorRecord>, DoctorError> {
        let filters = [("doctor_id", format!("eq.{}", doctor_id))];

        let mut rows = self.supabase
            .select::<DoctorRecord>(DOCTORS_TABLE, &filters)
            .await
            .map_err(store_error)?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn pull_slot(&self, doctor_id: &str, day: Weekday, time: &str) -> Result<u64, DoctorError> {
        let args = json!({
            "p_doctor_id": doctor_id,
            "p_day": day.as_str(),
            "p_time": time,
        });

        let modified: u64 = self.supabase
            .rpc(PULL_SLOT_FUNCTION, args)
            .await
            .map_err(store_error)?;

        info!("pull_schedule_slot({}, {}, {}) modified {}", doctor_id, day, time, modified);
        Ok(modified)
    }

    async fn insert_many(&self, records: Vec<DoctorRecord>) -> Result<Vec<String>, DoctorError> {
        let records: Vec<DoctorRecord> = records
            .into_iter()
            .map(|mut record| {
                record.weekly_schedule.dedup_slots();
                record
            })
            .collect();

        let body = serde_json::to_value(&records).map_err(|e| DoctorError::Store(e.to_string()))?;

        let inserted: Vec<Value> = self.supabase
            .insert(DOCTORS_TABLE, body)
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.starts_with("Conflict") {
                    DoctorError::DuplicateId(message)
                } else {
                    store_error(e)
                }
            })?;

        let ids = inserted
            .iter()
            .filter_map(|row| row["doctor_id"].as_str().map(str::to_string))
            .collect::<Vec<_>>();

        info!("Inserted {} doctor records into Supabase", ids.len());
        Ok(ids)
    }
}
