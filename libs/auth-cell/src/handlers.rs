use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use shared_models::auth::{LoginResponse, UserAccount, UserLogin};
use shared_models::error::AppError;

use crate::models::CredentialError;
use crate::services::{CredentialStore, PasswordService};

#[derive(Clone)]
pub struct AuthCellState {
    pub store: Arc<dyn CredentialStore>,
}

impl AuthCellState {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::UserExists(_) => AppError::Conflict(err.to_string()),
            CredentialError::InvalidCredentials => AppError::Auth(err.to_string()),
            CredentialError::Validation(_) => AppError::ValidationError(err.to_string()),
            CredentialError::Hashing(_) => AppError::Internal(err.to_string()),
            CredentialError::Store(_) => AppError::Database(err.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AuthCellState>,
    Json(credentials): Json<UserLogin>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let username = credentials.username.trim().to_string();
    PasswordService::validate_registration(&username, &credentials.password)?;

    debug!("Registering {}", username);

    if state.store.find_one(&username).await?.is_some() {
        return Err(CredentialError::UserExists(username).into());
    }

    let account = UserAccount {
        username: username.clone(),
        password_hash: PasswordService::hash_password(&credentials.password)?,
        created_at: Utc::now(),
    };
    state.store.insert_one(account).await?;

    info!("Registered {}", username);
    Ok((StatusCode::CREATED, Json(LoginResponse { authenticated: true, username })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AuthCellState>,
    Json(credentials): Json<UserLogin>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = credentials.username.trim().to_string();

    let account = state.store.find_one(&username).await?
        .ok_or(CredentialError::InvalidCredentials)?;

    if !PasswordService::verify_password(&credentials.password, &account.password_hash)? {
        warn!("Failed login for {}", username);
        return Err(CredentialError::InvalidCredentials.into());
    }

    info!("Login for {}", username);
    Ok(Json(LoginResponse { authenticated: true, username }))
}
