//! `POST /echo` boundary.
//!
//! # Responsibilities
//! - Validate `count` and the body before anything reaches the dispatcher
//! - Build the dispatch context (request ID, shutdown signal)
//! - Map the dispatcher's `(text, error)` pair onto a response

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;

use crate::fanout::Context;
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct EchoParams {
    pub count: Option<String>,
}

/// Request rejected before dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EchoRequestError {
    #[error("invalid count query parameter: {0}")]
    InvalidCount(String),

    #[error("count {count} exceeds maximum {max}")]
    CountTooLarge { count: usize, max: usize },

    #[error("empty request body")]
    EmptyBody,

    #[error("read body: {0}")]
    Body(String),
}

impl IntoResponse for EchoRequestError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// An absent or empty `count` falls back to `default`.
pub fn parse_count(raw: Option<&str>, default: usize, max: usize) -> Result<usize, EchoRequestError> {
    let count = match raw {
        None | Some("") => default,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| EchoRequestError::InvalidCount(raw.to_string()))?,
    };
    if count > max {
        return Err(EchoRequestError::CountTooLarge { count, max });
    }
    Ok(count)
}

pub fn parse_input(body: &[u8]) -> Result<String, EchoRequestError> {
    if body.is_empty() {
        return Err(EchoRequestError::EmptyBody);
    }
    String::from_utf8(body.to_vec()).map_err(|e| EchoRequestError::Body(e.to_string()))
}

pub async fn echo_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EchoParams>,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let response = handle_echo(&state, &headers, &params, &body).await;
    metrics::record_request(response.status().as_u16(), start);
    response
}

async fn handle_echo(
    state: &AppState,
    headers: &HeaderMap,
    params: &EchoParams,
    body: &[u8],
) -> Response {
    let count = match parse_count(
        params.count.as_deref(),
        state.http.default_count,
        state.http.max_count,
    ) {
        Ok(count) => count,
        Err(e) => return e.into_response(),
    };
    let input = match parse_input(body) {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    let request_id = headers.request_id().unwrap_or("unknown");
    tracing::info!(request_id = %request_id, input = %input, count, "echo");

    let ctx = Context::background()
        .with_request_id(request_id)
        .with_cancel(state.cancel.clone());

    match state.dispatcher.execute(&ctx, &input, count).await {
        (output, None) => (StatusCode::OK, output).into_response(),
        (_, Some(err)) => {
            tracing::warn!(request_id = %request_id, failures = err.len(), "echo failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("echo: {}", err)).into_response()
        }
    }
}
