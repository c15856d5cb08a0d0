//! Integration tests against a mock OpenRouter-compatible server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use routechat::chat::ChatSession;
use routechat::{
    ChatMessage, ChatRequest, Credential, KnownModel, Message, Model, OpenRouter, decode_completion,
};

fn client(server: &MockServer) -> OpenRouter {
    OpenRouter::with_options(
        Credential::new("test-key"),
        Some(&format!("{}/api/v1", server.uri())),
        Some(Duration::from_secs(5)),
    )
    .unwrap()
    .with_backoff(Duration::from_millis(1), Duration::from_millis(5))
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "gen-1",
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[tokio::test]
async fn posts_chat_request_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "deepseek/deepseek-r1:free",
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": "hello"}]}
            ]
        })))
        .respond_with(completion("world"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(
        Model::Known(KnownModel::DeepSeekR1),
        vec![ChatMessage::user("hello")],
    );
    let body = client(&server).send(request).await.unwrap();
    assert_eq!(decode_completion(&body).unwrap(), Some("world".to_string()));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "No auth credentials found", "code": 401}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(Model::from("m1"), vec![ChatMessage::user("hi")]);
    let err = client(&server).send(request).await.unwrap_err();
    assert!(err.is_authentication());
    assert!(err.to_string().contains("No auth credentials found"));
}

#[tokio::test]
async fn retries_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(completion("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(Model::from("m1"), vec![ChatMessage::user("hi")]);
    let body = client(&server).send(request).await.unwrap();
    assert_eq!(
        decode_completion(&body).unwrap(),
        Some("recovered".to_string())
    );
}

#[tokio::test]
async fn gives_up_after_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let request = ChatRequest::new(Model::from("m1"), vec![ChatMessage::user("hi")]);
    let err = client(&server).send(request).await.unwrap_err();
    assert_eq!(err.status_code(), Some(502));
}

#[tokio::test]
async fn rate_limit_without_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(Model::from("m1"), vec![ChatMessage::user("hi")]);
    let err = client(&server)
        .with_max_retries(0)
        .send(request)
        .await
        .unwrap_err();
    assert!(err.is_rate_limit());
    assert_eq!(err.retry_after(), Some(7));
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "model is required", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(Model::from("m1"), vec![ChatMessage::user("hi")]);
    let err = client(&server).send(request).await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(!err.is_retryable());
    assert!(err.is_exchange_recoverable());
}

#[tokio::test]
async fn discovers_free_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "deepseek/deepseek-r1:free",
                    "name": "DeepSeek R1 (free)",
                    "pricing": {"prompt": "0", "completion": "0"}
                },
                {
                    "id": "openai/gpt-4o",
                    "name": "GPT-4o",
                    "pricing": {"prompt": "0.0000025", "completion": "0.00001"}
                },
                {
                    "id": "acme/tiny:free",
                    "name": "Tiny",
                    "pricing": {"prompt": "0", "completion": "0"}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = client(&server).free_model_catalog().await.unwrap();
    assert_eq!(
        catalog.labels(),
        vec![
            "deepseek/deepseek-r1:free".to_string(),
            "acme/tiny:free".to_string()
        ]
    );
    assert_eq!(
        catalog.get(0),
        Some(&Model::Known(KnownModel::DeepSeekR1))
    );
}

#[tokio::test]
async fn discovery_without_free_models_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "openai/gpt-4o",
                    "name": "GPT-4o",
                    "pricing": {"prompt": "0.0000025", "completion": "0.00001"}
                }
            ]
        })))
        .mount(&server)
        .await;

    assert!(client(&server).free_model_catalog().await.is_err());
}

#[tokio::test]
async fn session_carries_history_to_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_json(json!({
            "model": "m2",
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": "hello"}]}
            ]
        })))
        .respond_with(completion("world"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_json(json!({
            "model": "m2",
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": "hello"}]},
                {"role": "assistant", "content": [{"type": "text", "text": "world"}]},
                {"role": "user", "content": [{"type": "text", "text": "again"}]}
            ]
        })))
        .respond_with(completion("still here"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(Arc::new(client(&server)), Model::from("m2"));
    assert_eq!(
        session.exchange("hello").await.unwrap(),
        Some("world".to_string())
    );
    assert_eq!(
        session.exchange("again").await.unwrap(),
        Some("still here".to_string())
    );
    assert_eq!(
        session.messages(),
        &[
            Message::user("hello"),
            Message::assistant("world"),
            Message::user("again"),
            Message::assistant("still here"),
        ]
    );
}

#[tokio::test]
async fn session_survives_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(completion("ok"))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(Arc::new(client(&server)), Model::from("m1"));
    let err = session.exchange("first").await.unwrap_err();
    assert!(err.is_exchange_recoverable());
    assert_eq!(session.message_count(), 0);

    assert_eq!(session.exchange("second").await.unwrap(), Some("ok".to_string()));
    assert_eq!(
        session.messages(),
        &[Message::user("second"), Message::assistant("ok")]
    );
}
