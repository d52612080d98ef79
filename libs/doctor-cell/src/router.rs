use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{self, DoctorCellState};

pub fn doctor_routes(state: DoctorCellState) -> Router {
    Router::new()
        .route("/get_doctors/{specialization}", get(handlers::get_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/delete_availability/", post(handlers::delete_availability))
        .route("/populate", post(handlers::populate_doctors))
        .with_state(state)
}
