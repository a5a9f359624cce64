use super::*;
use crate::llm::Role;
use serial_test::serial;

fn local_config() -> LlmConfig {
    LlmConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        api_path: "/v1/chat/completions".to_string(),
        model: "test-model".to_string(),
        api_key_env: "KNOWLEDGE_RAG_TEST_UNSET_KEY".to_string(),
        temperature: 0.2,
        max_tokens: 256,
        timeout_seconds: 5,
        retry_attempts: 4,
        ..LlmConfig::default()
    }
}

#[test]
fn client_configuration() {
    let client = ChatClient::new(&local_config()).expect("Failed to create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.max_tokens, 256);
    assert_eq!(client.endpoint.host_str(), Some("test-host"));
    assert_eq!(client.endpoint.port(), Some(1234));
    assert_eq!(client.endpoint.path(), "/v1/chat/completions");
    assert_eq!(client.retry_attempts, 4);
    assert_eq!(client.retry_backoff, DEFAULT_RETRY_BACKOFF);
    assert!(client.api_key.is_none());
}

#[test]
fn client_builder_methods() {
    let client = ChatClient::new(&local_config())
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(0)
        .with_retry_backoff(Duration::from_millis(5))
        .with_api_key(Some("sk-test".to_string()));

    assert_eq!(client.retry_attempts, 1);
    assert_eq!(client.retry_backoff, Duration::from_millis(5));
    assert_eq!(client.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn invalid_endpoint_is_a_configuration_error() {
    let config = LlmConfig {
        host: "bad host name".to_string(),
        ..local_config()
    };

    let result = ChatClient::new(&config);
    assert!(matches!(result, Err(LlmError::Configuration(_))));
}

#[test]
#[serial]
fn api_key_is_read_from_environment() {
    let config = LlmConfig {
        api_key_env: "KNOWLEDGE_RAG_TEST_API_KEY".to_string(),
        ..local_config()
    };

    // SAFETY: serialized with every other test touching this variable
    unsafe { env::set_var("KNOWLEDGE_RAG_TEST_API_KEY", "sk-from-env") };
    let with_key = ChatClient::new(&config).expect("Failed to create client");

    // SAFETY: as above
    unsafe { env::set_var("KNOWLEDGE_RAG_TEST_API_KEY", "   ") };
    let blank_key = ChatClient::new(&config).expect("Failed to create client");

    // SAFETY: as above
    unsafe { env::remove_var("KNOWLEDGE_RAG_TEST_API_KEY") };

    assert_eq!(with_key.api_key.as_deref(), Some("sk-from-env"));
    assert!(blank_key.api_key.is_none());
}

#[test]
fn debug_output_hides_api_key() {
    let client = ChatClient::new(&local_config())
        .expect("Failed to create client")
        .with_api_key(Some("sk-secret-value".to_string()));

    let debug = format!("{:?}", client);
    assert!(!debug.contains("sk-secret-value"));
    assert!(debug.contains("has_api_key: true"));
}

#[test]
fn request_body_shape() {
    let messages = vec![
        ChatMessage::system("be brief"),
        ChatMessage::user("Чем выровнять стены?"),
    ];
    let request = ChatCompletionRequest {
        model: "test-model",
        messages: &messages,
        temperature: 0.5,
        max_tokens: 100,
    };

    let value = serde_json::to_value(&request).expect("should serialize request");

    assert_eq!(value["model"], "test-model");
    assert_eq!(value["max_tokens"], 100);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
    assert_eq!(value["messages"][1]["content"], "Чем выровнять стены?");
}

#[test]
fn response_parsing_accepts_extra_fields() {
    let body = r#"{
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Штукатуркой."}}],
        "usage": {"total_tokens": 10}
    }"#;

    let response: ChatCompletionResponse =
        serde_json::from_str(body).expect("should parse response");

    assert_eq!(response.choices.len(), 1);
    assert_eq!(
        response.choices[0].message.content.as_deref(),
        Some("Штукатуркой.")
    );
}

#[test]
fn status_codes_map_to_error_kinds() {
    assert!(matches!(
        LlmError::from(ureq::Error::StatusCode(401)),
        LlmError::ClientStatus(401)
    ));
    assert!(matches!(
        LlmError::from(ureq::Error::StatusCode(429)),
        LlmError::RateLimited
    ));
    assert!(matches!(
        LlmError::from(ureq::Error::StatusCode(503)),
        LlmError::ServerStatus(503)
    ));
    assert!(matches!(
        LlmError::from(ureq::Error::ConnectionFailed),
        LlmError::Transport(_)
    ));
}

#[test]
fn retry_policy() {
    assert!(LlmError::ServerStatus(500).is_retryable());
    assert!(LlmError::ServerStatus(502).is_retryable());
    assert!(LlmError::RateLimited.is_retryable());
    assert!(LlmError::Transport("reset".to_string()).is_retryable());

    assert!(!LlmError::ClientStatus(400).is_retryable());
    assert!(!LlmError::ClientStatus(401).is_retryable());
    assert!(!LlmError::ClientStatus(403).is_retryable());
    assert!(!LlmError::InvalidResponse("bad json".to_string()).is_retryable());
    assert!(!LlmError::Configuration("bad url".to_string()).is_retryable());
}

#[test]
fn message_roles_serialize_lowercase() {
    let value = serde_json::to_value(ChatMessage::assistant("ok")).expect("should serialize");
    assert_eq!(value["role"], "assistant");
    assert_eq!(ChatMessage::system("x").role, Role::System);
}
