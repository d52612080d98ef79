use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::error::AppError;

use doctor_cell::DoctorStore;

use crate::models::{ChatQuery, ChatResponse};
use crate::services::{AgentDispatcher, CompletionClient, OpenAiClient, SessionStore};

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Clone)]
pub struct AssistantState {
    pub dispatcher: Arc<AgentDispatcher>,
    pub sessions: Arc<SessionStore>,
}

impl AssistantState {
    pub fn new(completion: Arc<dyn CompletionClient>, store: Arc<dyn DoctorStore>) -> Self {
        Self {
            dispatcher: Arc::new(AgentDispatcher::new(completion, store)),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// State backed by the OpenAI client built from configuration.
    pub fn from_config(config: &AppConfig, store: Arc<dyn DoctorStore>) -> Self {
        Self::new(Arc::new(OpenAiClient::new(config)), store)
    }
}

#[axum::debug_handler]
pub async fn chat(
    State(state): State<AssistantState>,
    Path(prompt): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = query.session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    if prompt.trim().is_empty() {
        return Err(AppError::BadRequest("Prompt must not be empty".to_string()));
    }

    let mut session = state.sessions.lock_active(&session_id).await;

    debug!("Chat turn for session {}", session_id);
    let turn = state.dispatcher.handle_turn(&mut session, &prompt).await;

    if turn.ended {
        // Unregister before releasing the lock so waiters move to a new session.
        state.sessions.remove(&session_id).await;
        drop(session);
        info!("Conversation {} closed", session_id);
    }

    Ok(Json(ChatResponse {
        session_id,
        reply: turn.reply,
        ended: turn.ended,
    }))
}
