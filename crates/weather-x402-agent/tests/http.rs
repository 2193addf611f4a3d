use std::sync::Arc;

use actix_web::{test, web, App};

use x402_agent::classifier::{GREETING_REPLY, WEATHER_REPLY};
use x402_agent::identity::derive_address;
use x402_agent::routes::{self, AgentState};
use x402_agent::{spawn_agent, ConversationStore, KeywordClassifier};

fn make_state() -> web::Data<AgentState> {
    let store = Arc::new(ConversationStore::default());
    let handle = spawn_agent(KeywordClassifier::default(), store, 8);
    web::Data::new(AgentState::new(
        handle,
        "SmartAgent",
        derive_address("test-seed"),
    ))
}

#[actix_rt::test]
async fn test_submit_returns_reply_and_echoes_correlation_id() {
    let app = test::init_service(App::new().app_data(make_state()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/submit")
        .set_json(serde_json::json!({
            "message": "Get weather for: weather in Delhi",
            "user_address": "0xabc",
            "correlation_id": "c-42",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], WEATHER_REPLY);
    assert_eq!(body["correlation_id"], "c-42");
    assert!(body.get("error").is_none());
}

#[actix_rt::test]
async fn test_conversation_log_is_readable() {
    let app = test::init_service(App::new().app_data(make_state()).configure(routes::configure)).await;

    for message in ["hello", "what's the forecast"] {
        let req = test::TestRequest::post()
            .uri("/submit")
            .set_json(serde_json::json!({
                "message": message,
                "conversation_id": "conv-1",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    let req = test::TestRequest::get().uri("/conversations/conv-1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["conversation_id"], "conv-1");
    assert_eq!(body["exchanges"].as_array().unwrap().len(), 2);
    assert_eq!(body["exchanges"][0]["user_message"], "hello");
    assert_eq!(body["exchanges"][0]["agent_response"], GREETING_REPLY);
    assert!(body["exchanges"][1]["timestamp"].is_i64());

    let req = test::TestRequest::get().uri("/conversations/missing").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
async fn test_health_reports_identity() {
    let app = test::init_service(App::new().app_data(make_state()).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agent"], "SmartAgent");
    assert_eq!(body["address"], derive_address("test-seed"));
    assert_eq!(body["processed"], 0);
}

#[actix_rt::test]
async fn test_submit_rejects_body_without_message() {
    let app = test::init_service(App::new().app_data(make_state()).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/submit")
        .set_json(serde_json::json!({ "text": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
