use std::sync::Arc;

use tracing::{debug, warn};

use doctor_cell::Specialization;

use crate::error::AssistantError;
use crate::services::completion::CompletionClient;
use crate::services::session::ConversationSession;

/// Maps a symptom description to a medical specialization with one
/// completion call.
pub struct SpecializationClassifier {
    completion: Arc<dyn CompletionClient>,
}

impl SpecializationClassifier {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Classifies and records the answer as the session's specialization.
    /// Answers outside the known list are kept as given.
    pub async fn classify(
        &self,
        symptom: &str,
        session: &mut ConversationSession,
    ) -> Result<String, AssistantError> {
        debug!("Classifying symptom: {}", symptom);

        let raw = self.completion.complete(&diagnosis_prompt(symptom)).await?;
        let specialization = clean_specialization(&raw);

        if specialization.is_empty() {
            return Err(AssistantError::Completion("Empty specialization from completion service".to_string()));
        }

        if Specialization::from_label(&specialization).is_none() {
            warn!("Classifier answered outside the known list: {:?}", specialization);
        }

        session.set_specialization(specialization.clone());
        Ok(specialization)
    }
}

pub fn diagnosis_prompt(symptom: &str) -> String {
    format!(
        "A patient describes their issue as: '{}'.\n\
         Based on this symptom, identify the most appropriate medical specialization from:\n\
         {}.\n\
         Just return the specialization only.",
        symptom.trim(),
        Specialization::catalogue()
    )
}

/// Trims whitespace, quotes and trailing punctuation, then drops a trailing
/// "specialist" qualifier.
pub fn clean_specialization(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '`')
        .trim_end_matches(['.', '!'])
        .trim();

    let without_qualifier = ["specialists", "specialist"]
        .iter()
        .find_map(|qualifier| {
            let cut = trimmed.len().checked_sub(qualifier.len())?;
            let tail = trimmed.get(cut..)?;
            tail.eq_ignore_ascii_case(qualifier).then(|| &trimmed[..cut])
        })
        .unwrap_or(trimmed);

    without_qualifier.trim().to_string()
}
