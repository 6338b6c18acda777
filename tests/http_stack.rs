//! Full runs over HTTP against local stand-ins for the chat and search APIs.

use std::time::Duration;

use research_agent::agent::{APOLOGY, AgentConfig, Orchestrator};
use research_agent::core::{ErrorKind, Step};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content.to_string()},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
}

async fn mount_chat(server: &MockServer, model: &str, content: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(format!("\"model\":\"{model}\"")))
        .respond_with(completion(&content))
        .mount(server)
        .await;
}

fn config(llm: &MockServer, search: &MockServer) -> AgentConfig {
    AgentConfig::builder()
        .api_key("sk-test")
        .provider("openai")
        .base_url(llm.uri())
        .query_model("query-model")
        .reflect_model("reflect-model")
        .synthesizer_model("synth-model")
        .search_api_key("tvly-test")
        .search_url(format!("{}/search", search.uri()))
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn answers_over_http() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    mount_chat(
        &llm,
        "query-model",
        json!({"queries": ["capital of France", "France capital city"]}),
    )
    .await;
    mount_chat(&llm, "reflect-model", json!({"need_more": false, "new_queries": null})).await;
    mount_chat(
        &llm,
        "synth-model",
        json!({"answer": "Paris is the capital of France.", "cited_ids": [2, "1"]}),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"url": "https://en.wikipedia.org/wiki/Paris", "title": "Paris", "content": "Paris is the capital of France."},
                {"url": "https://www.britannica.com/place/Paris", "title": "Paris | Britannica", "content": "Capital of France."}
            ]
        })))
        .expect(2)
        .mount(&search)
        .await;

    let orchestrator =
        Orchestrator::from_config(&config(&llm, &search)).unwrap_or_else(|_| unreachable!());
    let report = orchestrator
        .run("What is the capital of France?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(report.answer, "Paris is the capital of France.[1][2]");
    assert_eq!(report.citations.len(), 2);
    assert_eq!(
        report.citations[0].url,
        "https://www.britannica.com/place/Paris"
    );
    assert_eq!(report.documents_collected, 2);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn search_429_over_http_apologizes() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    mount_chat(&llm, "query-model", json!({"queries": ["capital of France"]})).await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&search)
        .await;

    let orchestrator =
        Orchestrator::from_config(&config(&llm, &search)).unwrap_or_else(|_| unreachable!());
    let report = orchestrator
        .run("What is the capital of France?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(report.answer, APOLOGY);
    assert!(report.citations.is_empty());
    assert_eq!(report.errors[0].step, Step::Search);
    assert_eq!(report.errors[0].kind, ErrorKind::RateLimit);
}

#[tokio::test]
async fn malformed_query_output_is_an_llm_failure() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    mount_chat(&llm, "query-model", json!("just some prose")).await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&search)
        .await;

    let orchestrator =
        Orchestrator::from_config(&config(&llm, &search)).unwrap_or_else(|_| unreachable!());
    let report = orchestrator
        .run("What is the capital of France?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(report.answer, APOLOGY);
    assert_eq!(report.errors[0].step, Step::Generate);
    assert_eq!(report.errors[0].kind, ErrorKind::LlmFailure);
}

#[tokio::test]
async fn chat_429_fails_generation_without_retry() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit reached for requests",
                "type": "requests",
                "param": null,
                "code": "rate_limit_exceeded"
            }
        })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&search)
        .await;

    let orchestrator =
        Orchestrator::from_config(&config(&llm, &search)).unwrap_or_else(|_| unreachable!());
    let started = std::time::Instant::now();
    let report = orchestrator
        .run("What is the capital of France?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.answer, APOLOGY);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].step, Step::Generate);
    assert_eq!(report.errors[0].kind, ErrorKind::RateLimit);
    let requests = llm.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}
