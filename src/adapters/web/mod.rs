//! Web chat adapter.
//!
//! Axum server rendering one chat page. A turn runs on tokio's blocking pool
//! since the model client is synchronous. HTMX requests get the conversation
//! fragment back, with the sidebar swapped out-of-band, instead of a redirect.
//! `GET /call?line=...` runs a function line against the data without the model.

mod error;
mod handlers;
mod templates;

pub use error::{status_from_error, WebError};
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::{Arc, Mutex};

use crate::domain::assistant::AssistantOptions;
use crate::domain::fund_data::FundData;
use crate::domain::session::Session;
use crate::ports::model_port::ModelPort;

pub struct AppState {
    pub data: Arc<FundData>,
    pub model: Arc<dyn ModelPort>,
    pub options: AssistantOptions,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(data: Arc<FundData>, model: Arc<dyn ModelPort>, options: AssistantOptions) -> Self {
        Self {
            data,
            model,
            options,
            session: Mutex::new(Session::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::chat_page))
        .route("/ask", post(handlers::ask))
        .route("/call", get(handlers::call))
        .route("/clear", post(handlers::clear))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
