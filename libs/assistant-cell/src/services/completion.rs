use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::AssistantError;
use crate::models::{ChatMessage, ChatReply, ToolCall, ToolSpec};

/// Hosted text-completion capability the assistant is written against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Single prompt in, plain text out.
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError>;

    /// Chat history plus available tools in; either an answer or tool calls out.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatReply, AssistantError>;
}

/// OpenAI chat-completions client.
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig) -> Self {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({}), using defaults", e);
                Client::new()
            });

        Self {
            http_client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }

    async fn send(&self, body: Value) -> Result<Value, AssistantError> {
        if self.api_key.is_empty() {
            return Err(AssistantError::Completion("OPENAI_API_KEY is not configured".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Calling completion endpoint {}", url);

        let response = self.http_client.post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                AssistantError::Completion(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(AssistantError::Completion(format!("OpenAI API error ({}): {}", status, error_text)));
        }

        response.json::<Value>().await
            .map_err(|e| AssistantError::Completion(format!("Invalid OpenAI response body: {}", e)))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        match parse_reply(&self.send(body).await?)? {
            ChatReply::Text(text) => Ok(text),
            ChatReply::ToolCalls(_) => Err(AssistantError::Completion(
                "Unexpected tool call in plain completion".to_string(),
            )),
        }
    }

    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatReply, AssistantError> {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(message_to_wire).collect::<Vec<_>>(),
        });

        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_to_wire).collect());
            body["tool_choice"] = json!("auto");
        }

        parse_reply(&self.send(body).await?)
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System { content } => json!({ "role": "system", "content": content }),
        ChatMessage::User { content } => json!({ "role": "user", "content": content }),
        ChatMessage::Assistant { content } => json!({ "role": "assistant", "content": content }),
        ChatMessage::ToolCalls { calls } => json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": calls.iter().map(|call| json!({
                "id": call.id,
                "type": "function",
                "function": {
                    "name": call.name,
                    "arguments": call.arguments.to_string(),
                }
            })).collect::<Vec<_>>(),
        }),
        ChatMessage::ToolResult { call_id, content } => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
    }
}

fn tool_to_wire(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

fn parse_reply(response: &Value) -> Result<ChatReply, AssistantError> {
    let message = &response["choices"][0]["message"];

    if let Some(calls) = message["tool_calls"].as_array().filter(|calls| !calls.is_empty()) {
        let calls = calls
            .iter()
            .map(|call| {
                let raw_arguments = call["function"]["arguments"].as_str().unwrap_or("{}");
                ToolCall {
                    id: call["id"].as_str().unwrap_or_default().to_string(),
                    name: call["function"]["name"].as_str().unwrap_or_default().to_string(),
                    // Unparseable arguments are kept verbatim and rejected by the tool.
                    arguments: serde_json::from_str(raw_arguments)
                        .unwrap_or_else(|_| Value::String(raw_arguments.to_string())),
                }
            })
            .collect();
        return Ok(ChatReply::ToolCalls(calls));
    }

    message["content"]
        .as_str()
        .map(|text| ChatReply::Text(text.trim().to_string()))
        .ok_or_else(|| AssistantError::Completion("Invalid OpenAI response format".to_string()))
}
