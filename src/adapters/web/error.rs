//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::FundchatError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &FundchatError) -> StatusCode {
    match err {
        FundchatError::CallParse(_)
        | FundchatError::UnknownFunction { .. }
        | FundchatError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        FundchatError::FundNotFound { .. } => StatusCode::NOT_FOUND,
        FundchatError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FundchatError::ModelUnavailable { .. }
        | FundchatError::ModelResponse { .. }
        | FundchatError::EmptyAnswer => {
            StatusCode::BAD_GATEWAY
        }
        FundchatError::ModelTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        FundchatError::ConfigParse { .. }
        | FundchatError::ConfigInvalid { .. }
        | FundchatError::DataLoad { .. }
        | FundchatError::MissingColumn { .. }
        | FundchatError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<FundchatError> for WebError {
    fn from(err: FundchatError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = super::templates::ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}
