use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use assistant_cell::router::assistant_routes;
use assistant_cell::AssistantState;
use auth_cell::router::auth_routes;
use auth_cell::{AuthCellState, CredentialStore};
use doctor_cell::router::doctor_routes;
use doctor_cell::{DoctorCellState, DoctorStore};
use shared_config::AppConfig;

pub fn create_router(
    config: Arc<AppConfig>,
    doctor_store: Arc<dyn DoctorStore>,
    credential_store: Arc<dyn CredentialStore>,
) -> Router {
    let assistant_state = AssistantState::from_config(&config, doctor_store.clone());

    Router::new()
        .route("/", get(|| async { "DocTalk API is running!" }))
        .merge(doctor_routes(DoctorCellState::new(config, doctor_store)))
        .merge(assistant_routes(assistant_state))
        .merge(auth_routes(AuthCellState::new(credential_store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use auth_cell::InMemoryCredentialStore;
    use doctor_cell::{DoctorRecord, InMemoryDoctorStore};
    use shared_utils::test_utils::{MockDoctorDocuments, TestConfig};

    async fn app() -> Router {
        let records: Vec<DoctorRecord> = MockDoctorDocuments::mixed_panel()
            .into_iter()
            .map(|doc| serde_json::from_value(doc).unwrap())
            .collect();
        let doctor_store = Arc::new(InMemoryDoctorStore::with_records(records).await.unwrap());

        create_router(TestConfig::default().to_arc(), doctor_store, Arc::new(InMemoryCredentialStore::new()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn liveness() {
        let (status, body) = get(app().await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"DocTalk API is running!");
    }

    #[tokio::test]
    async fn cells_share_one_doctor_store() {
        let app = app().await;

        let (status, body) = get(app.clone(), "/doctors/D0102").await;
        assert_eq!(status, StatusCode::OK);
        let doctor: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doctor["primary_specialization"], "ENT");

        let (status, _) = get(app, "/chat/quit").await;
        assert_eq!(status, StatusCode::OK);
    }
}
