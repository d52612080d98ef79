use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use doctor_cell::{DoctorRecord, DoctorSearchService, DoctorStore, WeeklySchedule};

use crate::error::AssistantError;
use crate::models::ToolSpec;
use crate::services::booking::{BookingOutcome, SlotBookingService};
use crate::services::classifier::SpecializationClassifier;
use crate::services::completion::CompletionClient;
use crate::services::session::ConversationSession;

pub const DIAGNOSE_TOOL: &str = "diagnose_specialization";
pub const SEARCH_TOOL: &str = "get_top_doctor_names";
pub const SCHEDULE_TOOL: &str = "get_doctor_schedule_by_id";
pub const BOOK_TOOL: &str = "book_appointment_slot";

/// A capability the model may call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }

    async fn invoke(&self, arguments: &Value, session: &mut ConversationSession) -> Result<ToolOutput, AssistantError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Diagnosis { specialization: String },
    Doctors { specialization: String, doctors: Vec<(String, String)> },
    Schedule { doctor_id: String, name: String, schedule: WeeklySchedule },
    Booking(BookingOutcome),
}

impl ToolOutput {
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Diagnosis { specialization } => format!(
                "You may need a {} specialist. Would you like me to find top doctors?",
                specialization
            ),
            ToolOutput::Doctors { doctors, .. } if doctors.is_empty() => {
                "No doctors found for that specialization.".to_string()
            }
            ToolOutput::Doctors { doctors, .. } => {
                let lines: Vec<String> = doctors
                    .iter()
                    .enumerate()
                    .map(|(index, (doctor_id, name))| format!("{}. {} (ID: {})", index + 1, name, doctor_id))
                    .collect();
                format!(
                    "Here are the top {} doctors:\n\n{}\n\nPlease enter the Doctor ID to view the schedule.",
                    doctors.len(),
                    lines.join("\n")
                )
            }
            ToolOutput::Schedule { doctor_id, name, schedule } => {
                let mut text = format!("Availability for {} (ID: {}):", name, doctor_id);
                let open_days: Vec<String> = schedule
                    .iter()
                    .filter(|(_, slots)| !slots.is_empty())
                    .map(|(day, slots)| format!("{}: {}", day, slots.join(", ")))
                    .collect();

                if open_days.is_empty() {
                    text.push_str("\nNo open slots this week.");
                } else {
                    text.push('\n');
                    text.push_str(&open_days.join("\n"));
                    text.push_str("\n\nTell me a day and time to book, for example 'Monday at 10am'.");
                }
                text
            }
            ToolOutput::Booking(outcome) => outcome.message(),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T, AssistantError> {
    serde_json::from_value(arguments.clone()).map_err(|e| AssistantError::InvalidToolArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct DiagnoseArgs {
    symptom: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleArgs {
    doctor_id: String,
}

#[derive(Debug, Deserialize)]
struct BookArgs {
    query: String,
}

pub struct DiagnoseTool {
    classifier: SpecializationClassifier,
}

#[async_trait]
impl Tool for DiagnoseTool {
    fn name(&self) -> &'static str {
        DIAGNOSE_TOOL
    }

    fn description(&self) -> &'static str {
        "Suggest the medical specialization that fits a patient's symptom description."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symptom": { "type": "string", "description": "The patient's symptoms in their own words" }
            },
            "required": ["symptom"]
        })
    }

    async fn invoke(&self, arguments: &Value, session: &mut ConversationSession) -> Result<ToolOutput, AssistantError> {
        let args: DiagnoseArgs = parse_arguments(self.name(), arguments)?;
        let specialization = self.classifier.classify(&args.symptom, session).await?;
        Ok(ToolOutput::Diagnosis { specialization })
    }
}

pub struct SearchTool {
    search: DoctorSearchService,
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        SEARCH_TOOL
    }

    fn description(&self) -> &'static str {
        "List the top rated doctors for a specialization. Defaults to the last suggested specialization."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "specialization": { "type": "string", "description": "Medical specialization, e.g. Cardiology" }
            }
        })
    }

    async fn invoke(&self, arguments: &Value, session: &mut ConversationSession) -> Result<ToolOutput, AssistantError> {
        let args: SearchArgs = parse_arguments(self.name(), arguments)?;
        let specialization = args
            .specialization
            .filter(|s| !s.trim().is_empty())
            .or_else(|| session.last_specialization().map(str::to_string))
            .ok_or_else(|| AssistantError::InvalidToolArguments {
                tool: self.name().to_string(),
                reason: "no specialization given and none suggested yet".to_string(),
            })?;

        let doctors = self.search.top_doctors(&specialization).await?;
        let listing = doctors
            .iter()
            .map(|doctor| (doctor.doctor_id.clone(), doctor.name.clone()))
            .collect();

        session.set_specialization(specialization.clone());
        session.replace_search_results(doctors);

        Ok(ToolOutput::Doctors { specialization, doctors: listing })
    }
}

pub struct ScheduleTool {
    store: Arc<dyn DoctorStore>,
}

impl ScheduleTool {
    // Prefer the store's current schedule; the search snapshot may be stale.
    async fn current_record(&self, snapshot: DoctorRecord) -> DoctorRecord {
        match self.store.find_by_id(&snapshot.doctor_id).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) => snapshot,
            Err(e) => {
                warn!("Falling back to cached schedule for {}: {}", snapshot.doctor_id, e);
                snapshot
            }
        }
    }
}

#[async_trait]
impl Tool for ScheduleTool {
    fn name(&self) -> &'static str {
        SCHEDULE_TOOL
    }

    fn description(&self) -> &'static str {
        "Select one of the listed doctors by ID and show their weekly availability."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "doctor_id": { "type": "string", "description": "Doctor ID from the last search, e.g. D0024" }
            },
            "required": ["doctor_id"]
        })
    }

    async fn invoke(&self, arguments: &Value, session: &mut ConversationSession) -> Result<ToolOutput, AssistantError> {
        let args: ScheduleArgs = parse_arguments(self.name(), arguments)?;
        let snapshot = session.select_doctor(&args.doctor_id)?.clone();
        let doctor = self.current_record(snapshot).await;

        Ok(ToolOutput::Schedule {
            doctor_id: doctor.doctor_id,
            name: doctor.name,
            schedule: doctor.weekly_schedule,
        })
    }
}

pub struct BookTool {
    booking: SlotBookingService,
}

#[async_trait]
impl Tool for BookTool {
    fn name(&self) -> &'static str {
        BOOK_TOOL
    }

    fn description(&self) -> &'static str {
        "Book a slot with the selected doctor from a phrase like 'Monday at 10am'."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Requested day and time, e.g. 'Monday at 10am'" }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, arguments: &Value, session: &mut ConversationSession) -> Result<ToolOutput, AssistantError> {
        let args: BookArgs = parse_arguments(self.name(), arguments)?;
        let outcome = self.booking.book(session, &args.query).await?;
        Ok(ToolOutput::Booking(outcome))
    }
}

/// The fixed set of tools offered to the model.
pub struct ToolSet {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolSet {
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn standard(store: Arc<dyn DoctorStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self::new(vec![
            Box::new(DiagnoseTool { classifier: SpecializationClassifier::new(completion) }),
            Box::new(SearchTool { search: DoctorSearchService::new(store.clone()) }),
            Box::new(ScheduleTool { store: store.clone() }),
            Box::new(BookTool { booking: SlotBookingService::new(store) }),
        ])
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        session: &mut ConversationSession,
    ) -> Result<ToolOutput, AssistantError> {
        let tool = self.get(name).ok_or_else(|| AssistantError::UnknownTool(name.to_string()))?;
        debug!("Invoking tool {} with {}", name, arguments);
        tool.invoke(arguments, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use doctor_cell::{InMemoryDoctorStore, Weekday};

    use crate::services::completion::MockCompletionClient;

    async fn cardiology_store() -> Arc<InMemoryDoctorStore> {
        let schedule: WeeklySchedule = [
            (Weekday::Monday, vec!["10:00".to_string(), "11:00".to_string()]),
            (Weekday::Friday, vec!["12:00".to_string()]),
        ]
        .into_iter()
        .collect();

        let records = vec![
            DoctorRecord::new("D0011", "Dr. Anil Rao", "Cardiology", 4.2, 8),
            DoctorRecord::new("D0024", "Dr. Meera Iyer", "Cardiology", 4.9, 15).with_schedule(schedule),
            DoctorRecord::new("D0101", "Dr. Sara Khan", "Dermatology", 4.6, 9),
        ];
        Arc::new(InMemoryDoctorStore::with_records(records).await.unwrap())
    }

    fn tools(store: Arc<InMemoryDoctorStore>) -> ToolSet {
        ToolSet::standard(store, Arc::new(MockCompletionClient::new()))
    }

    #[tokio::test]
    async fn advertises_four_tools() {
        let set = tools(cardiology_store().await);
        let names: Vec<String> = set.specs().into_iter().map(|spec| spec.name).collect();
        assert_eq!(names, vec![DIAGNOSE_TOOL, SEARCH_TOOL, SCHEDULE_TOOL, BOOK_TOOL]);
    }

    #[tokio::test]
    async fn search_replaces_results_and_renders_listing() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t1");

        let output = set
            .invoke(SEARCH_TOOL, &json!({ "specialization": "cardio" }), &mut session)
            .await
            .unwrap();

        let text = output.render();
        assert!(text.starts_with("Here are the top 2 doctors:"));
        assert!(text.contains("1. Dr. Meera Iyer (ID: D0024)"));
        assert!(text.contains("2. Dr. Anil Rao (ID: D0011)"));
        assert_eq!(session.last_search_results().len(), 2);
        assert_eq!(session.last_specialization(), Some("cardio"));
    }

    #[tokio::test]
    async fn empty_search_still_replaces_results() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t2");
        set.invoke(SEARCH_TOOL, &json!({ "specialization": "Cardiology" }), &mut session).await.unwrap();

        let output = set.invoke(SEARCH_TOOL, &json!({ "specialization": "Urology" }), &mut session).await.unwrap();
        assert_eq!(output.render(), "No doctors found for that specialization.");
        assert!(session.last_search_results().is_empty());
    }

    #[tokio::test]
    async fn search_without_any_specialization_is_rejected() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t3");

        assert_matches!(
            set.invoke(SEARCH_TOOL, &json!({}), &mut session).await,
            Err(AssistantError::InvalidToolArguments { .. })
        );
    }

    #[tokio::test]
    async fn schedule_selects_doctor() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t4");
        set.invoke(SEARCH_TOOL, &json!({ "specialization": "Cardiology" }), &mut session).await.unwrap();

        let output = set.invoke(SCHEDULE_TOOL, &json!({ "doctor_id": "d0024" }), &mut session).await.unwrap();
        let text = output.render();
        assert!(text.starts_with("Availability for Dr. Meera Iyer (ID: D0024):"));
        assert!(text.contains("Monday: 10:00, 11:00"));
        assert!(text.contains("Friday: 12:00"));
        assert_eq!(session.selected_doctor_id(), Some("D0024"));
    }

    #[tokio::test]
    async fn schedule_for_unlisted_doctor_is_a_selection_error() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t5");
        set.invoke(SEARCH_TOOL, &json!({ "specialization": "Cardiology" }), &mut session).await.unwrap();

        assert_matches!(
            set.invoke(SCHEDULE_TOOL, &json!({ "doctor_id": "D0101" }), &mut session).await,
            Err(AssistantError::DoctorNotInResults(id)) if id == "D0101"
        );
        assert_eq!(session.selected_doctor_id(), None);
    }

    #[tokio::test]
    async fn schedule_reflects_bookings() {
        let store = cardiology_store().await;
        let set = tools(store.clone());
        let mut session = ConversationSession::new("t6");
        set.invoke(SEARCH_TOOL, &json!({ "specialization": "Cardiology" }), &mut session).await.unwrap();
        set.invoke(SCHEDULE_TOOL, &json!({ "doctor_id": "D0024" }), &mut session).await.unwrap();

        let booked = set.invoke(BOOK_TOOL, &json!({ "query": "monday at 10am" }), &mut session).await.unwrap();
        assert_matches!(booked, ToolOutput::Booking(BookingOutcome::Booked(_)));

        let output = set.invoke(SCHEDULE_TOOL, &json!({ "doctor_id": "D0024" }), &mut session).await.unwrap();
        assert!(output.render().contains("Monday: 11:00"));
    }

    #[tokio::test]
    async fn malformed_arguments_and_unknown_tools() {
        let set = tools(cardiology_store().await);
        let mut session = ConversationSession::new("t7");

        assert_matches!(
            set.invoke(BOOK_TOOL, &json!("monday 10am"), &mut session).await,
            Err(AssistantError::InvalidToolArguments { tool, .. }) if tool == BOOK_TOOL
        );
        assert_matches!(
            set.invoke("cancel_everything", &json!({}), &mut session).await,
            Err(AssistantError::UnknownTool(name)) if name == "cancel_everything"
        );
    }
}
