use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    DeleteAvailabilityRequest, DeleteAvailabilityResponse, DoctorError, PopulateResponse, Weekday,
};
use crate::services::{seed::load_seed_file, store::DoctorStore};

pub const SLOT_NOT_FOUND: &str = "slot not found or doctor id invalid";

#[derive(Clone)]
pub struct DoctorCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DoctorStore>,
}

impl DoctorCellState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn DoctorStore>) -> Self {
        Self { config, store }
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::InvalidDay(_) => AppError::ValidationError(err.to_string()),
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::DuplicateId(_) => AppError::Conflict(err.to_string()),
            DoctorError::Store(_) => AppError::Database(err.to_string()),
            DoctorError::Seed(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn get_doctors(
    State(state): State<DoctorCellState>,
    Path(specialization): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.store.find_by_specialization(&specialization).await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<DoctorCellState>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.store.find_by_id(&doctor_id).await?
        .ok_or(DoctorError::NotFound(doctor_id))?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<DoctorCellState>,
    Json(request): Json<DeleteAvailabilityRequest>,
) -> Result<Json<DeleteAvailabilityResponse>, AppError> {
    let day: Weekday = request.day.parse()?;
    let time = request.time.trim();

    debug!("Removing availability {} {} for doctor {}", day, time, request.doctor_id);

    let modified_count = state.store.pull_slot(&request.doctor_id, day, time).await?;
    if modified_count == 0 {
        return Err(AppError::NotFound(SLOT_NOT_FOUND.to_string()));
    }

    Ok(Json(DeleteAvailabilityResponse {
        message: format!("Removed {} {} from doctor {}", day, time, request.doctor_id),
        modified_count,
    }))
}

#[axum::debug_handler]
pub async fn populate_doctors(
    State(state): State<DoctorCellState>,
) -> Result<(StatusCode, Json<PopulateResponse>), AppError> {
    let path = state.config.doctor_seed_path.clone()
        .ok_or_else(|| AppError::BadRequest("DOCTOR_SEED_PATH is not configured".to_string()))?;

    let records = load_seed_file(&path).await?;
    let inserted_ids = state.store.insert_many(records).await?;

    info!("Populated {} doctors from {}", inserted_ids.len(), path.display());
    Ok((StatusCode::CREATED, Json(PopulateResponse { inserted_ids })))
}
