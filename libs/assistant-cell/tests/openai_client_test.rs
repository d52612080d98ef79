use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assistant_cell::{AssistantError, ChatMessage, ChatReply, CompletionClient, OpenAiClient, ToolCall, ToolSpec};
use shared_utils::test_utils::{MockCompletionResponses, TestConfig};

fn search_tool() -> ToolSpec {
    ToolSpec {
        name: "get_top_doctor_names".to_string(),
        description: "List doctors".to_string(),
        parameters: json!({ "type": "object", "properties": { "specialization": { "type": "string" } } }),
    }
}

#[tokio::test]
async fn test_complete_sends_single_user_message() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-openai-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Which specialist?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockCompletionResponses::text("ENT")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(&config);
    assert_eq!(client.complete("Which specialist?").await.unwrap(), "ENT");
}

#[tokio::test]
async fn test_chat_advertises_tools_and_parses_calls() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "tool_choice": "auto",
            "tools": [{ "type": "function", "function": { "name": "get_top_doctor_names" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockCompletionResponses::tool_call(
            "get_top_doctor_names",
            json!({ "specialization": "Neurology" }),
        )))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(&config);
    let messages = vec![ChatMessage::system("You are a helpful AI medical assistant."), ChatMessage::user("headaches")];
    let reply = client.chat(&messages, &[search_tool()]).await.unwrap();

    assert_matches!(
        reply,
        ChatReply::ToolCalls(calls) if matches!(
            calls.as_slice(),
            [ToolCall { name, arguments, .. }] if name == "get_top_doctor_names" && arguments["specialization"] == "Neurology"
        )
    );
}

#[tokio::test]
async fn test_server_error_becomes_completion_error() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(MockCompletionResponses::error("overloaded")))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(&config);
    let err = client.complete("hello").await.unwrap_err();
    assert_matches!(err, AssistantError::Completion(ref message) if message.contains("500"));
    assert!(err.user_message().starts_with("Sorry"));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    config.request_timeout_secs = 1;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockCompletionResponses::text("late"))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(&config);
    assert_matches!(client.complete("hello").await, Err(AssistantError::Completion(_)));
}
