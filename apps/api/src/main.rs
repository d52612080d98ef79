use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use auth_cell::{CredentialStore, InMemoryCredentialStore, SupabaseCredentialStore};
use doctor_cell::services::seed::load_seed_file;
use doctor_cell::{DoctorStore, InMemoryDoctorStore, SupabaseDoctorStore};
use shared_config::{AppConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DocTalk API server");

    let config = Arc::new(AppConfig::from_env());

    if !config.is_completion_configured() {
        warn!("OPENAI_API_KEY is not set; /chat will answer with an apology");
    }

    let (doctor_store, credential_store) = build_stores(&config).await;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(config.clone(), doctor_store, credential_store)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_stores(config: &AppConfig) -> (Arc<dyn DoctorStore>, Arc<dyn CredentialStore>) {
    match config.store_backend {
        StoreBackend::Supabase => {
            info!("Using Supabase stores at {}", config.supabase_url);
            let doctors: Arc<dyn DoctorStore> = Arc::new(SupabaseDoctorStore::new(config));
            let credentials: Arc<dyn CredentialStore> = Arc::new(SupabaseCredentialStore::new(config));
            (doctors, credentials)
        }
        StoreBackend::Memory => {
            info!("Using in-memory stores");
            let doctors = InMemoryDoctorStore::new();

            // Supabase data is persistent and loaded through /populate instead.
            if let Some(path) = &config.doctor_seed_path {
                match load_seed_file(path).await {
                    Ok(records) => match doctors.insert_many(records).await {
                        Ok(ids) => info!("Seeded {} doctors from {}", ids.len(), path.display()),
                        Err(e) => warn!("Failed to seed doctors: {}", e),
                    },
                    Err(e) => warn!("Failed to read seed file: {}", e),
                }
            }

            let doctors: Arc<dyn DoctorStore> = Arc::new(doctors);
            let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
            (doctors, credentials)
        }
    }
}
