//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::{Arc, MutexGuard};
use tracing::info;

use crate::domain::assistant::{Assistant, SETUP_INSTRUCTIONS};
use crate::domain::function_call;
use crate::domain::session::Session;

use super::templates::{ChatTemplate, ChatView, TurnTemplate};
use super::{is_htmx_request, AppState, WebError};

fn session(state: &AppState) -> Result<MutexGuard<'_, Session>, WebError> {
    state
        .session
        .lock()
        .map_err(|_| WebError::internal("session lock poisoned"))
}

fn render<T: Template>(template: &T) -> Result<Response, WebError> {
    template
        .render()
        .map(|html| Html(html).into_response())
        .map_err(|e| WebError::internal(format!("template error: {}", e)))
}

async fn model_available(state: &Arc<AppState>) -> Result<bool, WebError> {
    let model = state.model.clone();
    tokio::task::spawn_blocking(move || model.is_available())
        .await
        .map_err(|e| WebError::internal(e.to_string()))
}

pub async fn chat_page(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let available = model_available(&state).await?;
    let view = ChatView::from_session(&*session(&state)?);
    render(&ChatTemplate::new(available, SETUP_INSTRUCTIONS, &view))
}

#[derive(Debug, serde::Deserialize)]
pub struct AskForm {
    pub question: String,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Result<Response, WebError> {
    let question = form.question.trim().to_string();
    if question.is_empty() {
        return Err(WebError::bad_request("Question is empty"));
    }

    let turn_state = state.clone();
    let turn_question = question.clone();
    let reply = tokio::task::spawn_blocking(move || {
        let assistant = Assistant::new(
            &turn_state.data,
            turn_state.model.as_ref(),
            turn_state.options,
        );
        assistant.respond(&turn_question)
    })
    .await
    .map_err(|e| WebError::internal(e.to_string()))?;

    if let Some(answer) = &reply.answer {
        info!(call = %answer.call, "web turn answered");
    }

    let view = {
        let mut session = session(&state)?;
        session.push_user(question);
        session.record(&reply);
        ChatView::from_session(&session)
    };

    if is_htmx_request(&headers) {
        render(&TurnTemplate::new(&view))
    } else {
        Ok(Redirect::to("/").into_response())
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct CallQuery {
    pub line: String,
}

pub async fn call(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallQuery>,
) -> Result<Response, WebError> {
    let (call, result) = function_call::run_line(&state.data, &query.line)?;
    Ok(Json(json!({ "call": call.to_string(), "data": result.to_json() })).into_response())
}

pub async fn clear(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    session(&state)?.clear();
    Ok(Redirect::to("/").into_response())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let available = model_available(&state).await?;
    Ok(Json(json!({ "available": available })).into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
