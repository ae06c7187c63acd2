#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Chat page renders status banner, sidebar and history
//! - Asking through a form post and through HTMX
//! - Clearing the conversation
//! - Running function lines over `/call` with domain errors mapped to statuses
//! - Health endpoint and error pages

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fundchat::adapters::web::{build_router, status_from_error, AppState, WebError};
use fundchat::domain::assistant::AssistantOptions;
use fundchat::domain::error::FundchatError;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn create_test_app(model: Arc<MockModelPort>) -> Router {
    let state = AppState::new(Arc::new(sample_data()), model, AssistantOptions::default());
    build_router(state)
}

fn ask_request(question: &str, htmx: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    let body = format!("question={}", question.replace(' ', "+"));
    builder.body(Body::from(body)).unwrap()
}

async fn get_html(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

mod chat_page_tests {
    use super::*;

    #[tokio::test]
    async fn chat_page_renders_with_ok_status() {
        let app = create_test_app(Arc::new(MockModelPort::new()));
        let (status, html) = get_html(&app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Fund Analytics Chatbot"));
        assert!(html.contains("Model service is running and ready."));
        assert!(html.contains("Total Messages: <strong>0</strong>"));
        assert!(html.contains("Show me top 5 holdings"));
        assert!(html.contains("name=\"question\""));
    }

    #[tokio::test]
    async fn chat_page_shows_setup_when_model_down() {
        let app = create_test_app(Arc::new(MockModelPort::new().unavailable()));
        let (status, html) = get_html(&app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Model service is not running."));
        assert!(html.contains("ollama serve"));
        assert!(!html.contains("name=\"question\""));
    }
}

mod ask_tests {
    use super::*;

    #[tokio::test]
    async fn form_post_redirects_and_records_turn() {
        let model = Arc::new(
            MockModelPort::new()
                .with_reply("FUNCTION: get_all_funds()")
                .with_reply("There are 2 funds, Alpha and Beta."),
        );
        let app = create_test_app(model.clone());

        let response = app.clone().oneshot(ask_request("Which funds", false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let (_, html) = get_html(&app, "/").await;
        assert!(html.contains("Which funds"));
        assert!(html.contains("There are 2 funds, Alpha and Beta."));
        assert!(html.contains("Total Messages: <strong>2</strong>"));
        assert!(html.contains("Conversation Turns: <strong>1</strong>"));
        assert!(html.contains("<summary>get_all_funds()</summary>"));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn htmx_post_returns_conversation_fragment() {
        let model = Arc::new(
            MockModelPort::new()
                .with_reply("FUNCTION: get_total_trades()")
                .with_reply("There are 4 trades in total."),
        );
        let app = create_test_app(model);

        let response = app.oneshot(ask_request("How many trades", true)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);

        assert!(html.contains("There are 4 trades in total."));
        assert!(html.contains("class=\"message user\""));
        assert!(!html.contains("<html"));
        assert!(html.contains("<aside id=\"sidebar\" hx-swap-oob=\"true\">"));
        assert!(html.contains("Total Messages: <strong>2</strong>"));
        assert!(html.contains("<summary>get_total_trades()</summary>"));
    }

    #[tokio::test]
    async fn failed_turn_shows_generic_message() {
        let model = Arc::new(
            MockModelPort::new()
                .with_reply("FUNCTION: get_top_holdings(fund=Nowhere)"),
        );
        let app = create_test_app(model);

        let response = app.oneshot(ask_request("Top holdings of Nowhere", true)).await.unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Sorry, I cannot find the answer to your question in the database."));
    }

    #[tokio::test]
    async fn empty_question_is_bad_request() {
        let model = Arc::new(MockModelPort::new());
        let app = create_test_app(model.clone());

        let response = app.oneshot(ask_request("   ", false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }
}

mod call_tests {
    use super::*;

    #[tokio::test]
    async fn call_returns_json_result() {
        let model = Arc::new(MockModelPort::new());
        let app = create_test_app(model.clone());
        let (status, body) = get_html(&app, "/call?line=get_total_trades(fund%3Dalpha)").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "call": "get_total_trades(fund=alpha)", "data": 3 })
        );
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn call_maps_domain_errors_to_statuses() {
        let app = create_test_app(Arc::new(MockModelPort::new()));

        let (status, html) = get_html(&app, "/call?line=get_top_holdings(fund%3DOmega)").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("no fund named Omega"));

        let (status, _) = get_html(&app, "/call?line=get_all_funds").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, html) = get_html(&app, "/call?line=get_weather()").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("unknown function: get_weather"));
    }
}

mod clear_tests {
    use super::*;

    #[tokio::test]
    async fn clear_empties_history() {
        let model = Arc::new(
            MockModelPort::new()
                .with_reply("FUNCTION: get_all_funds()")
                .with_reply("Alpha and Beta."),
        );
        let app = create_test_app(model);
        app.clone().oneshot(ask_request("Which funds", false)).await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let (_, html) = get_html(&app, "/").await;
        assert!(html.contains("Total Messages: <strong>0</strong>"));
        assert!(!html.contains("Cached Data"));
    }
}

mod misc_tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_availability() {
        let app = create_test_app(Arc::new(MockModelPort::new().unavailable()));
        let (status, body) = get_html(&app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "available": false }));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = create_test_app(Arc::new(MockModelPort::new()));
        let (status, html) = get_html(&app, "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Page not found"));
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_from_error(&FundchatError::ModelTimeout { secs: 5 }),
            StatusCode::GATEWAY_TIMEOUT
        );
        let err = WebError::from(FundchatError::FundNotFound { fund: "x".into() });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.message.contains("no fund named x"));
    }
}
