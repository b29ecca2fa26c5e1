mod common;

use common::{gemini, stub};
use nexus::{
    ai::{EMPTY_REPLY, FAILURE_REPLY, Gemini, Role, SYSTEM_INSTRUCTION, Turn, UNAVAILABLE_REPLY},
    config::AiConfig,
};
use serde_json::json;
use tokio::net::TcpListener;

#[tokio::test]
async fn sends_instruction_prompt_and_temperature() {
    let reply = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "there" }] }
        }]
    });
    let (base_url, captured) = stub("200 OK", reply.to_string()).await;

    assert_eq!(gemini(&base_url).complete("hi").await, "Hello there");

    let captured = captured.await.unwrap();
    assert!(captured.request_line.starts_with("POST /v1beta/models/test-model:generateContent?key=test-key"));
    assert_eq!(captured.body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
    assert_eq!(captured.body["contents"], json!([{ "role": "user", "parts": [{ "text": "hi" }] }]));
    assert!((captured.body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn history_turns_go_before_the_prompt() {
    let reply = json!({ "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }] });
    let (base_url, captured) = stub("200 OK", reply.to_string()).await;
    let history = [
        Turn { role: Role::User, text: "first".to_owned() },
        Turn { role: Role::Model, text: "answer".to_owned() },
    ];

    assert_eq!(gemini(&base_url).complete_with_history("second", &history).await, "ok");

    let roles: Vec<_> = captured.await.unwrap().body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|turn| turn["role"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(roles, ["user", "model", "user"]);
}

#[tokio::test]
async fn thought_parts_are_left_out() {
    let reply = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "thinking...", "thought": true }, { "text": "answer" }] }
        }]
    });
    let (base_url, _captured) = stub("200 OK", reply.to_string()).await;

    assert_eq!(gemini(&base_url).complete("q").await, "answer");
}

#[tokio::test]
async fn empty_response_gets_the_apology() {
    let (base_url, _captured) = stub("200 OK", json!({ "candidates": [] }).to_string()).await;

    assert_eq!(gemini(&base_url).complete("q").await, EMPTY_REPLY);
}

#[tokio::test]
async fn error_status_gets_the_failure_reply() {
    let body = json!({ "error": { "code": 429, "message": "quota" } }).to_string();
    let (base_url, _captured) = stub("429 Too Many Requests", body).await;

    assert_eq!(gemini(&base_url).complete("q").await, FAILURE_REPLY);
}

#[tokio::test]
async fn garbage_body_gets_the_failure_reply() {
    let (base_url, _captured) = stub("200 OK", "<html>".to_owned()).await;

    assert_eq!(gemini(&base_url).complete("q").await, FAILURE_REPLY);
}

#[tokio::test]
async fn no_key_means_no_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1beta", listener.local_addr().unwrap());
    let gemini = Gemini::new(&AiConfig {
        base_url,
        ..AiConfig::default()
    });

    assert_eq!(gemini.complete("q").await, UNAVAILABLE_REPLY);

    let accepted = tokio::time::timeout(std::time::Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection expected");
}
