use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use doctor_cell::DoctorStore;

use crate::models::{ChatMessage, ChatReply, TurnReply};
use crate::services::booking::BookingOutcome;
use crate::services::completion::CompletionClient;
use crate::services::session::ConversationSession;
use crate::services::time_expression::matches_time_expression;
use crate::services::tools::{ToolOutput, ToolSet, BOOK_TOOL, SCHEDULE_TOOL, SEARCH_TOOL};

/// Model round trips allowed per turn before giving up on a text answer.
pub const MAX_TOOL_ROUNDS: usize = 4;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI medical assistant.";
pub const FOLLOW_UP_PROMPT: &str = "Would you like help with anything else?";
pub const GOODBYE: &str = "Goodbye!";
pub const TAKE_CARE: &str = "Okay! Take care and feel better soon.";

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];
const DISMISSALS: [&str; 5] = ["no", "exit", "quit", "nah", "nope"];
const AFFIRMATIONS: [&str; 3] = ["yes", "ok", "sure"];

const ROUNDS_EXHAUSTED: &str = "Sorry, I couldn't finish that request. Could you rephrase it?";

/// Routes each patient utterance either straight to a tool or through the
/// completion model with the tool set attached.
pub struct AgentDispatcher {
    completion: Arc<dyn CompletionClient>,
    tools: ToolSet,
}

impl AgentDispatcher {
    pub fn new(completion: Arc<dyn CompletionClient>, store: Arc<dyn DoctorStore>) -> Self {
        let tools = ToolSet::standard(store, completion.clone());
        Self { completion, tools }
    }

    /// Handles one utterance. Every failure is turned into reply text; only
    /// an explicit exit or dismissal ends the conversation.
    pub async fn handle_turn(&self, session: &mut ConversationSession, utterance: &str) -> TurnReply {
        if session.is_ended() {
            warn!("Turn for ended session {} ignored", session.id());
            return TurnReply::farewell(GOODBYE);
        }

        let normalized = normalize(utterance);
        debug!("Session {} turn: {:?}", session.id(), normalized);

        if session.awaiting_follow_up() {
            session.set_awaiting_follow_up(false);
            if DISMISSALS.contains(&normalized.as_str()) {
                session.end();
                return TurnReply::farewell(TAKE_CARE);
            }
        }

        if EXIT_WORDS.contains(&normalized.as_str()) {
            session.end();
            return TurnReply::farewell(GOODBYE);
        }

        if AFFIRMATIONS.contains(&normalized.as_str()) {
            if let Some(specialization) = session.last_specialization().map(str::to_string) {
                let arguments = json!({ "specialization": specialization });
                return self.direct(session, utterance, SEARCH_TOOL, arguments).await;
            }
        }

        if let Some(doctor_id) = session.mentioned_candidate(utterance).map(|d| d.doctor_id.clone()) {
            let arguments = json!({ "doctor_id": doctor_id });
            return self.direct(session, utterance, SCHEDULE_TOOL, arguments).await;
        }

        if session.selected_doctor_id().is_some() && matches_time_expression(utterance) {
            let arguments = json!({ "query": utterance });
            return self.direct(session, utterance, BOOK_TOOL, arguments).await;
        }

        self.converse(session, utterance).await
    }

    // Runs one tool without asking the model, keeping the exchange in history.
    async fn direct(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> TurnReply {
        session.push_history(ChatMessage::user(utterance));

        let reply = match self.tools.invoke(tool, &arguments, session).await {
            Ok(output @ ToolOutput::Booking(BookingOutcome::Booked(_))) => {
                session.set_awaiting_follow_up(true);
                format!("{}\n\n{}", output.render(), FOLLOW_UP_PROMPT)
            }
            Ok(output) => output.render(),
            Err(e) => {
                warn!("Tool {} failed for session {}: {}", tool, session.id(), e);
                e.user_message()
            }
        };

        session.push_history(ChatMessage::assistant(reply.clone()));
        TurnReply::reply(reply)
    }

    async fn converse(&self, session: &mut ConversationSession, utterance: &str) -> TurnReply {
        session.push_history(ChatMessage::user(utterance));

        let specs = self.tools.specs();
        let mut last_tool_text = None;

        for round in 0..MAX_TOOL_ROUNDS {
            let mut messages = Vec::with_capacity(session.history().len() + 1);
            messages.push(ChatMessage::system(SYSTEM_PROMPT));
            messages.extend(session.history().iter().cloned());

            let calls = match self.completion.chat(&messages, &specs).await {
                Ok(ChatReply::Text(text)) => {
                    session.push_history(ChatMessage::assistant(text.clone()));
                    return TurnReply::reply(text);
                }
                Ok(ChatReply::ToolCalls(calls)) => calls,
                Err(e) => {
                    error!("Completion failed for session {}: {}", session.id(), e);
                    let reply = e.user_message();
                    session.push_history(ChatMessage::assistant(reply.clone()));
                    return TurnReply::reply(reply);
                }
            };

            debug!("Round {}: model requested {} tool call(s)", round + 1, calls.len());
            session.push_history(ChatMessage::ToolCalls { calls: calls.clone() });

            for call in calls {
                let content = match self.tools.invoke(&call.name, &call.arguments, session).await {
                    Ok(output) => output.render(),
                    Err(e) => {
                        warn!("Tool {} failed for session {}: {}", call.name, session.id(), e);
                        e.user_message()
                    }
                };
                last_tool_text = Some(content.clone());
                session.push_history(ChatMessage::ToolResult { call_id: call.id, content });
            }
        }

        info!("Session {} hit the tool round limit", session.id());
        let reply = last_tool_text.unwrap_or_else(|| ROUNDS_EXHAUSTED.to_string());
        session.push_history(ChatMessage::assistant(reply.clone()));
        TurnReply::reply(reply)
    }
}

fn normalize(utterance: &str) -> String {
    utterance
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase()
}
