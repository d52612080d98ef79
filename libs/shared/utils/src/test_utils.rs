use std::path::PathBuf;
use std::sync::Arc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub doctor_seed_path: Option<PathBuf>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            openai_api_key: "test-openai-key".to_string(),
            openai_base_url: "http://localhost:54322/v1".to_string(),
            doctor_seed_path: None,
        }
    }
}

impl TestConfig {
    /// Points both upstreams at a mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            openai_base_url: format!("{}/v1", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            openai_api_key: self.openai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            openai_model: "gpt-4o".to_string(),
            store_backend: StoreBackend::Memory,
            doctor_seed_path: self.doctor_seed_path.clone(),
            request_timeout_secs: 5,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockDoctorDocuments;

impl MockDoctorDocuments {
    pub fn doctor(id: &str, name: &str, specialization: &str, ratings: f64, years: u32) -> Value {
        json!({
            "doctor_id": id,
            "name": name,
            "gender": "Female",
            "years_of_experience": years,
            "degrees": ["MBBS", "MD"],
            "languages_spoken": ["English", "Tamil"],
            "bio": format!("{} is a {} consultant.", name, specialization),
            "primary_specialization": specialization,
            "treatable_conditions": [],
            "location": "Chennai",
            "distance_km": "<50",
            "hospital_affiliation": "City General Hospital",
            "consultation_modes": ["In-person", "Video"],
            "consultation_fee_usd": 40.0,
            "ratings": ratings,
            "number_of_reviews": 120,
            "accepting_new_patients": true,
            "profile_image_url": format!("https://example.com/img/{}.png", id),
            "medical_philosophy": "Listen first.",
            "weekly_schedule": Self::weekly_schedule()
        })
    }

    pub fn weekly_schedule() -> Value {
        json!({
            "Monday": ["10:00", "11:00", "14:30"],
            "Wednesday": ["09:00", "16:00"],
            "Friday": ["12:00"]
        })
    }

    /// Seven cardiologists, so a search has to rank and truncate.
    /// `D0024` has the best rating.
    pub fn cardiology_panel() -> Vec<Value> {
        vec![
            Self::doctor("D0011", "Dr. Arjun Rao", "Cardiology", 4.2, 8),
            Self::doctor("D0024", "Dr. Meera Iyer", "Cardiology", 4.9, 15),
            Self::doctor("D0031", "Dr. Kavya Nair", "Cardiology", 4.5, 10),
            Self::doctor("D0032", "Dr. Rahul Menon", "Cardiology", 4.5, 20),
            Self::doctor("D0040", "Dr. Sana Sheikh", "Interventional Cardiology", 4.7, 6),
            Self::doctor("D0045", "Dr. Vikram Das", "Cardiology", 3.9, 25),
            Self::doctor("D0050", "Dr. Priya Pillai", "Cardiology", 4.0, 2),
        ]
    }

    pub fn mixed_panel() -> Vec<Value> {
        let mut panel = Self::cardiology_panel();
        panel.push(Self::doctor("D0101", "Dr. Lena Joseph", "Dermatology", 4.6, 9));
        panel.push(Self::doctor("D0102", "Dr. Omar Khan", "ENT", 4.4, 11));
        panel
    }
}

pub struct MockCompletionResponses;

impl MockCompletionResponses {
    pub fn text(content: &str) -> Value {
        json!({
            "id": format!("chatcmpl-{}", Uuid::new_v4()),
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    pub fn tool_call(name: &str, arguments: Value) -> Value {
        json!({
            "id": format!("chatcmpl-{}", Uuid::new_v4()),
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": format!("call_{}", Uuid::new_v4().simple()),
                        "type": "function",
                        "function": { "name": name, "arguments": arguments.to_string() }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })
    }

    pub fn error(message: &str) -> Value {
        json!({
            "error": { "message": message, "type": "server_error" }
        })
    }
}
