use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{DoctorError, DoctorRecord};
use crate::services::store::DoctorStore;

/// How many candidates a search hands back to the patient.
pub const TOP_DOCTOR_LIMIT: usize = 5;

pub struct DoctorSearchService {
    store: Arc<dyn DoctorStore>,
}

impl DoctorSearchService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    /// Best rated doctors for a specialization. An empty vector means the
    /// store answered and nothing matched; store failures come back as `Err`.
    pub async fn top_doctors(&self, specialization: &str) -> Result<Vec<DoctorRecord>, DoctorError> {
        debug!("Searching top doctors for {}", specialization);

        let matches = self.store.find_by_specialization(specialization).await?;
        let total = matches.len();
        let ranked = rank_doctors(matches, TOP_DOCTOR_LIMIT);

        info!("Ranked {} of {} {} doctors", ranked.len(), total, specialization);
        Ok(ranked)
    }
}

/// Stable descending sort on `(ratings, years_of_experience)`, then truncate.
pub fn rank_doctors(mut doctors: Vec<DoctorRecord>, limit: usize) -> Vec<DoctorRecord> {
    doctors.sort_by(|a, b| compare_rank(b, a));
    doctors.truncate(limit);
    doctors
}

fn compare_rank(a: &DoctorRecord, b: &DoctorRecord) -> Ordering {
    a.ratings
        .total_cmp(&b.ratings)
        .then(a.years_of_experience.cmp(&b.years_of_experience))
}
