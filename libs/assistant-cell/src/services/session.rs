use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use doctor_cell::services::search::TOP_DOCTOR_LIMIT;
use doctor_cell::DoctorRecord;

use crate::error::AssistantError;
use crate::models::ChatMessage;

/// Upper bound on remembered chat messages fed back to the model.
pub const MAX_HISTORY_MESSAGES: usize = 40;

/// Conversation state carried between turns of one patient conversation.
///
/// `last_search_results` holds snapshots taken at search time; they are not
/// refreshed before booking.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    id: String,
    last_specialization: Option<String>,
    last_search_results: Vec<DoctorRecord>,
    selected_doctor_id: Option<String>,
    history: Vec<ChatMessage>,
    awaiting_follow_up: bool,
    ended: bool,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_specialization(&self) -> Option<&str> {
        self.last_specialization.as_deref()
    }

    pub fn set_specialization(&mut self, specialization: impl Into<String>) {
        let specialization = specialization.into();
        debug!("Session {} specialization -> {}", self.id, specialization);
        self.last_specialization = Some(specialization);
    }

    pub fn last_search_results(&self) -> &[DoctorRecord] {
        &self.last_search_results
    }

    /// A new search always replaces the previous candidates.
    pub fn replace_search_results(&mut self, mut doctors: Vec<DoctorRecord>) {
        doctors.truncate(TOP_DOCTOR_LIMIT);
        debug!("Session {} now has {} candidate doctors", self.id, doctors.len());
        self.last_search_results = doctors;
    }

    pub fn selected_doctor_id(&self) -> Option<&str> {
        self.selected_doctor_id.as_deref()
    }

    /// First candidate whose id appears anywhere in the utterance.
    pub fn mentioned_candidate(&self, utterance: &str) -> Option<&DoctorRecord> {
        let lowered = utterance.to_lowercase();
        self.last_search_results
            .iter()
            .find(|doctor| lowered.contains(&doctor.doctor_id.to_lowercase()))
    }

    /// Moves to the doctor-selected state. A miss leaves the session untouched.
    pub fn select_doctor(&mut self, doctor_id: &str) -> Result<&DoctorRecord, AssistantError> {
        let index = self.last_search_results
            .iter()
            .position(|doctor| doctor.doctor_id.eq_ignore_ascii_case(doctor_id.trim()))
            .ok_or_else(|| AssistantError::DoctorNotInResults(doctor_id.trim().to_string()))?;

        let doctor_id = self.last_search_results[index].doctor_id.clone();
        info!("Session {} selected doctor {}", self.id, doctor_id);
        self.selected_doctor_id = Some(doctor_id);
        Ok(&self.last_search_results[index])
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push_history(&mut self, message: ChatMessage) {
        self.history.push(message);
        self.trim_history();
    }

    // Drop whole exchanges from the front so a tool call is never separated
    // from its result.
    fn trim_history(&mut self) {
        while self.history.len() > MAX_HISTORY_MESSAGES {
            let next_user = self.history
                .iter()
                .skip(1)
                .position(ChatMessage::is_user)
                .map(|offset| offset + 1);

            match next_user {
                Some(cut) => {
                    self.history.drain(..cut);
                }
                None => break,
            }
        }
    }

    pub fn awaiting_follow_up(&self) -> bool {
        self.awaiting_follow_up
    }

    pub fn set_awaiting_follow_up(&mut self, awaiting: bool) {
        self.awaiting_follow_up = awaiting;
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end(&mut self) {
        info!("Session {} ended", self.id);
        self.ended = true;
    }
}

/// Live conversations keyed by conversation id. Holding a session's mutex
/// for a whole turn keeps turns of one conversation strictly sequential.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<ConversationSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<ConversationSession>> {
        if let Some(session) = self.sessions.read().await.get(session_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("Creating conversation session {}", session_id);
                Arc::new(Mutex::new(ConversationSession::new(session_id)))
            })
            .clone()
    }

    /// Locks the live session for `session_id`. A session that ended while
    /// this caller waited for the lock is skipped in favour of a fresh one.
    pub async fn lock_active(&self, session_id: &str) -> OwnedMutexGuard<ConversationSession> {
        loop {
            let guard = self.get_or_create(session_id).await.lock_owned().await;
            if !guard.is_ended() {
                return guard;
            }
            debug!("Session {} ended while waiting, retrying", session_id);
            drop(guard);
            // Whoever ended it may not have unregistered it yet.
            self.remove_ended(session_id).await;
        }
    }

    async fn remove_ended(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        let ended = match sessions.get(session_id) {
            Some(session) => match session.try_lock() {
                Ok(guard) => guard.is_ended(),
                Err(_) => false,
            },
            None => false,
        };
        if ended {
            sessions.remove(session_id);
        }
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
