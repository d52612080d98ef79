use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day keys of a weekly schedule. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
    #[serde(alias = "saturday")]
    Saturday,
    #[serde(alias = "sunday")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = DoctorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DoctorError::InvalidDay(value.to_string()))
    }
}

/// Open slots per weekday, each slot an `"HH:MM"` string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(BTreeMap<Weekday, Vec<String>>);

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self, day: Weekday) -> &[String] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_slot(&self, day: Weekday, time: &str) -> bool {
        self.slots(day).iter().any(|slot| slot == time)
    }

    /// Adds a slot unless it is already open. Returns whether it was added.
    pub fn add_slot(&mut self, day: Weekday, time: impl Into<String>) -> bool {
        let time = time.into();
        let slots = self.0.entry(day).or_default();
        if slots.contains(&time) {
            return false;
        }
        slots.push(time);
        true
    }

    /// Removes a slot if present. Returns whether anything changed.
    pub fn remove_slot(&mut self, day: Weekday, time: &str) -> bool {
        match self.0.get_mut(&day) {
            Some(slots) => {
                let before = slots.len();
                slots.retain(|slot| slot != time);
                slots.len() != before
            }
            None => false,
        }
    }

    /// Drops repeated slots inside each day, keeping first occurrences.
    pub fn dedup_slots(&mut self) {
        for slots in self.0.values_mut() {
            let mut seen = Vec::with_capacity(slots.len());
            slots.retain(|slot| {
                if seen.contains(slot) {
                    false
                } else {
                    seen.push(slot.clone());
                    true
                }
            });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[String])> {
        self.0.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    pub fn total_slots(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(Weekday, Vec<String>)> for WeeklySchedule {
    fn from_iter<I: IntoIterator<Item = (Weekday, Vec<String>)>>(iter: I) -> Self {
        let mut schedule = WeeklySchedule::new();
        for (day, slots) in iter {
            for slot in slots {
                schedule.add_slot(day, slot);
            }
        }
        schedule
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub doctor_id: String,
    pub name: String,
    pub primary_specialization: String,
    pub ratings: f64,
    pub years_of_experience: u32,
    #[serde(default)]
    pub weekly_schedule: WeeklySchedule,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub degrees: Vec<String>,
    #[serde(default)]
    pub languages_spoken: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub treatable_conditions: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub distance_km: Option<String>,
    #[serde(default)]
    pub hospital_affiliation: Option<String>,
    #[serde(default)]
    pub consultation_modes: Vec<String>,
    #[serde(default)]
    pub consultation_fee_usd: Option<f64>,
    #[serde(default)]
    pub number_of_reviews: Option<u32>,
    #[serde(default)]
    pub accepting_new_patients: Option<bool>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub medical_philosophy: Option<String>,
}

impl DoctorRecord {
    pub fn new(
        doctor_id: impl Into<String>,
        name: impl Into<String>,
        primary_specialization: impl Into<String>,
        ratings: f64,
        years_of_experience: u32,
    ) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            name: name.into(),
            primary_specialization: primary_specialization.into(),
            ratings,
            years_of_experience,
            weekly_schedule: WeeklySchedule::new(),
            gender: None,
            degrees: Vec::new(),
            languages_spoken: Vec::new(),
            bio: None,
            treatable_conditions: Vec::new(),
            location: None,
            distance_km: None,
            hospital_affiliation: None,
            consultation_modes: Vec::new(),
            consultation_fee_usd: None,
            number_of_reviews: None,
            accepting_new_patients: None,
            profile_image_url: None,
            medical_philosophy: None,
        }
    }

    pub fn with_schedule(mut self, weekly_schedule: WeeklySchedule) -> Self {
        self.weekly_schedule = weekly_schedule;
        self
    }

    pub fn matches_specialization(&self, pattern: &str) -> bool {
        self.primary_specialization
            .to_lowercase()
            .contains(&pattern.trim().to_lowercase())
    }
}

/// Medical fields the assistant can route a patient to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    #[serde(rename = "ENT")]
    Ent,
    #[serde(rename = "General Physician")]
    GeneralPhysician,
    #[serde(rename = "Obstetrics & Gynaecology")]
    ObstetricsGynaecology,
    Paediatrics,
    Orthopaedics,
    Dermatology,
    Urology,
    Neurology,
    Cardiology,
}

impl Specialization {
    pub const ALL: [Specialization; 9] = [
        Specialization::Ent,
        Specialization::GeneralPhysician,
        Specialization::ObstetricsGynaecology,
        Specialization::Paediatrics,
        Specialization::Orthopaedics,
        Specialization::Dermatology,
        Specialization::Urology,
        Specialization::Neurology,
        Specialization::Cardiology,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Specialization::Ent => "ENT",
            Specialization::GeneralPhysician => "General Physician",
            Specialization::ObstetricsGynaecology => "Obstetrics & Gynaecology",
            Specialization::Paediatrics => "Paediatrics",
            Specialization::Orthopaedics => "Orthopaedics",
            Specialization::Dermatology => "Dermatology",
            Specialization::Urology => "Urology",
            Specialization::Neurology => "Neurology",
            Specialization::Cardiology => "Cardiology",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Specialization::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(wanted))
    }

    /// Comma separated list used in prompts.
    pub fn catalogue() -> String {
        Specialization::ALL
            .iter()
            .map(Specialization::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAvailabilityRequest {
    pub doctor_id: String,
    pub day: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAvailabilityResponse {
    pub message: String,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulateResponse {
    pub inserted_ids: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Unknown day: {0}")]
    InvalidDay(String),

    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Doctor id already exists: {0}")]
    DuplicateId(String),

    #[error("Doctor store error: {0}")]
    Store(String),

    #[error("Seed file error: {0}")]
    Seed(String),
}
