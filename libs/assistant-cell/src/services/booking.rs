use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use doctor_cell::{DoctorStore, Weekday};

use crate::error::AssistantError;
use crate::services::session::ConversationSession;
use crate::services::time_expression::parse_time_expression;

pub const SLOT_NOT_FOUND_REASON: &str = "slot not found or doctor id invalid";

/// One booking attempt. Built per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub day: Weekday,
    pub time: String,
}

impl fmt::Display for BookingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Doctor {} on {} at {}", self.doctor_id, self.day, self.time)
    }
}

/// Both outcomes are normal answers; a missing slot is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(BookingRequest),
    SlotNotFound(BookingRequest),
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked(_))
    }

    pub fn request(&self) -> &BookingRequest {
        match self {
            BookingOutcome::Booked(request) | BookingOutcome::SlotNotFound(request) => request,
        }
    }

    pub fn message(&self) -> String {
        match self {
            BookingOutcome::Booked(request) => format!(
                "Appointment booked with Doctor {} on {} at {}.",
                request.doctor_id, request.day, request.time
            ),
            BookingOutcome::SlotNotFound(request) => format!(
                "Failed to book appointment: {} ({}).",
                SLOT_NOT_FOUND_REASON, request
            ),
        }
    }
}

pub struct SlotBookingService {
    store: Arc<dyn DoctorStore>,
}

impl SlotBookingService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    /// Claims the slot named in `query` for the session's selected doctor.
    ///
    /// The selection check runs before any parsing, so a session without a
    /// doctor always gets `NoDoctorSelected`. The store's conditional pull is
    /// the only source of truth for whether the slot was still open.
    pub async fn book(
        &self,
        session: &ConversationSession,
        query: &str,
    ) -> Result<BookingOutcome, AssistantError> {
        let doctor_id = session
            .selected_doctor_id()
            .ok_or(AssistantError::NoDoctorSelected)?;

        let expression = parse_time_expression(query)?;
        let request = BookingRequest {
            doctor_id: doctor_id.to_string(),
            day: expression.day,
            time: expression.time_label(),
        };

        debug!("Attempting booking: {}", request);

        let modified = self.store
            .pull_slot(&request.doctor_id, request.day, &request.time)
            .await?;

        if modified == 0 {
            info!("Booking not applied, {}: {}", SLOT_NOT_FOUND_REASON, request);
            return Ok(BookingOutcome::SlotNotFound(request));
        }

        info!("Booked {}", request);
        Ok(BookingOutcome::Booked(request))
    }
}
