use std::path::Path;

use tracing::debug;

use crate::models::{DoctorError, DoctorRecord};

/// Reads a JSON array of doctor documents.
pub async fn load_seed_file(path: &Path) -> Result<Vec<DoctorRecord>, DoctorError> {
    debug!("Loading doctor seed file {}", path.display());

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DoctorError::Seed(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&raw)
        .map_err(|e| DoctorError::Seed(format!("{}: {}", path.display(), e)))
}
