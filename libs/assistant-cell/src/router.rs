use axum::{routing::get, Router};

use crate::handlers::{self, AssistantState};

pub fn assistant_routes(state: AssistantState) -> Router {
    Router::new()
        .route("/chat/{prompt}", get(handlers::chat))
        .with_state(state)
}
