use axum::{routing::post, Router};

use crate::handlers::{self, AuthCellState};

pub fn auth_routes(state: AuthCellState) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .with_state(state)
}
