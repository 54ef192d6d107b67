//! Application failures and the diagnostic trail attached to failed
//! responses.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::highlight::HighlightError, domain::error::DomainError, infra::error::InfraError,
};

/// Diagnostic trail for a failed response. Handlers attach it as a response
/// extension; the logging middleware drains it, so a failure is reported in
/// exactly one place.
#[derive(Debug, Clone)]
pub struct ErrorTrace {
    pub origin: &'static str,
    pub chain: Vec<String>,
}

impl ErrorTrace {
    pub fn of(origin: &'static str, error: &dyn StdError) -> Self {
        Self {
            origin,
            chain: source_chain(error),
        }
    }

    pub fn message(origin: &'static str, message: impl Into<String>) -> Self {
        Self {
            origin,
            chain: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Flatten an error and its sources into displayable lines, outermost first.
fn source_chain(error: &dyn StdError) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        chain.push(inner.to_string());
        current = inner.source();
    }
    chain
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::UnknownDocument { .. }) => StatusCode::NOT_FOUND,
            AppError::Infra(_) | AppError::Highlight(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::UnknownDocument { .. }) => "Page not found",
            AppError::Infra(InfraError::Configuration { .. }) => "Server configuration problem",
            AppError::Infra(InfraError::Telemetry { .. }) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "Request handling hit an I/O failure",
            AppError::Highlight(_) => "Page could not be rendered",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let trace = ErrorTrace::of("application::error::AppError", &self);
        let mut response = (status, message).into_response();
        trace.attach(&mut response);
        response
    }
}
