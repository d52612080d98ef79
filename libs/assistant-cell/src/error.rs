use thiserror::Error;

use doctor_cell::DoctorError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Could not extract booking day/time. Try something like 'Monday at 10am'.")]
    NoMatch,

    #[error("{hour}:{minute:02}{meridian} is not a valid time of day.")]
    InvalidTime { hour: u32, minute: u32, meridian: String },
}

/// Coarse grouping used when deciding how to talk about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Parse,
    Selection,
    Upstream,
    Internal,
}

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("{0}")]
    UnparsableTime(#[from] TimeParseError),

    #[error("Please select a doctor first.")]
    NoDoctorSelected,

    #[error("Doctor ID {0} not found in the top 5 list.")]
    DoctorNotInResults(String),

    #[error("Invalid arguments for tool {tool}: {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Doctor store error: {0}")]
    Store(#[from] DoctorError),
}

impl AssistantError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AssistantError::UnparsableTime(_) => ErrorClass::Parse,
            AssistantError::NoDoctorSelected | AssistantError::DoctorNotInResults(_) => ErrorClass::Selection,
            AssistantError::Completion(_) | AssistantError::Store(_) => ErrorClass::Upstream,
            AssistantError::InvalidToolArguments { .. } | AssistantError::UnknownTool(_) => ErrorClass::Internal,
        }
    }

    /// Text shown to the patient in place of a tool result.
    pub fn user_message(&self) -> String {
        match self.class() {
            ErrorClass::Parse | ErrorClass::Selection => self.to_string(),
            ErrorClass::Upstream => match self {
                AssistantError::Store(_) => {
                    "Sorry, I couldn't reach the doctor directory just now. Please try again in a moment.".to_string()
                }
                _ => "Sorry, I'm having trouble thinking right now. Please try again in a moment.".to_string(),
            },
            ErrorClass::Internal => "Sorry, something went wrong handling that request. Could you rephrase it?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(AssistantError::from(TimeParseError::NoMatch).class(), ErrorClass::Parse);
        assert_eq!(AssistantError::NoDoctorSelected.class(), ErrorClass::Selection);
        assert_eq!(AssistantError::DoctorNotInResults("D1".into()).class(), ErrorClass::Selection);
        assert_eq!(AssistantError::Completion("timeout".into()).class(), ErrorClass::Upstream);
        assert_eq!(AssistantError::from(DoctorError::Store("down".into())).class(), ErrorClass::Upstream);
    }

    #[test]
    fn upstream_messages_hide_details() {
        let message = AssistantError::Completion("401 invalid key sk-123".into()).user_message();
        assert!(message.starts_with("Sorry"));
        assert!(!message.contains("sk-123"));
    }

    #[test]
    fn invalid_time_message_mentions_value() {
        let err = TimeParseError::InvalidTime { hour: 25, minute: 0, meridian: String::new() };
        assert_eq!(err.to_string(), "25:00 is not a valid time of day.");
    }
}
