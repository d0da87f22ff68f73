use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use universal_studio::config::{AgentRole, Config};
use universal_studio::errors::StudioError;
use universal_studio::provider::{Gateway, HttpTransport, ProviderConfig, Transport};
use universal_studio::wire::GenerationRequest;

fn request(role: AgentRole, model: &str) -> GenerationRequest {
    GenerationRequest {
        role,
        role_instruction: "You are a coder.".into(),
        user_prompt: "Architecture: one file".into(),
        model: model.into(),
    }
}

#[tokio::test]
async fn openai_compatible_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk_live"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "temperature": 0.5,
            "messages": [
                { "role": "system", "content": "You are a coder." },
                { "role": "user", "content": "Architecture: one file" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "### FILE: a.py\nprint(1)" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(30).unwrap();
    let provider = ProviderConfig::OpenAiCompatible { base_url: server.uri(), api_key: "gsk_live".into() };
    let text = transport
        .send(&provider, &request(AgentRole::Coder, "llama-3.3-70b-versatile"))
        .await
        .unwrap();
    assert_eq!(text, "### FILE: a.py\nprint(1)");
}

#[tokio::test]
async fn openai_compatible_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"error\":\"invalid api key\"}"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(30).unwrap();
    let provider = ProviderConfig::OpenAiCompatible { base_url: format!("{}/", server.uri()), api_key: "bad".into() };
    let err = transport.send(&provider, &request(AgentRole::Planner, "m")).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("401"), "{msg}");
    assert!(msg.contains("invalid api key"), "{msg}");
}

#[tokio::test]
async fn gemini_sends_system_instruction_and_generation_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "g_live"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": "You are a coder." }] },
            "contents": [{ "role": "user", "parts": [{ "text": "Architecture: one file" }] }],
            "generationConfig": { "temperature": 0.4, "maxOutputTokens": 8192 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "### FILE: " }, { "text": "b.js\nrun()" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(30).unwrap().with_gemini_base(server.uri());
    let provider = ProviderConfig::Native { api_key: "g_live".into() };
    let text = transport.send(&provider, &request(AgentRole::Coder, "gemini-1.5-flash")).await.unwrap();
    assert_eq!(text, "### FILE: b.js\nrun()");
}

#[tokio::test]
async fn gateway_reports_provider_failure_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = Config::default();
    cfg.google_key = "g_live".into();
    let gateway = Gateway::new(HttpTransport::new(30).unwrap().with_gemini_base(server.uri()), cfg, false);

    let err = gateway.complete(AgentRole::Coder, "Coder", "sys", "prompt").await.unwrap_err();
    match err {
        StudioError::ProviderCall { role, message } => {
            assert_eq!(role, AgentRole::Coder);
            assert!(message.contains("quota exhausted"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn gateway_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let gateway = Gateway::new(HttpTransport::new(30).unwrap().with_gemini_base(server.uri()), Config::default(), false);
    let err = gateway.complete(AgentRole::Revisor, "Revisor", "sys", "prompt").await.unwrap_err();
    assert!(matches!(err, StudioError::MissingCredential { role: AgentRole::Revisor, .. }));
}
