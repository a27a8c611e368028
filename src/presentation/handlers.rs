// HTTP request handlers
use crate::application::command_service::CommandReply;
use crate::error::AppError;
use crate::infrastructure::http_response::message_response;
use crate::infrastructure::slack_payload::parse_slash_command;
use crate::infrastructure::slack_signature::SignatureVerifier;
use crate::presentation::app_state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Slash command webhook. Verifies the signature over the raw body, then
/// acknowledges immediately; rendering happens in a detached task.
pub async fn slash_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let verified = SignatureVerifier::from_headers(
        &headers,
        state.signing_secret.expose_secret(),
        Utc::now(),
    )
    .and_then(|verifier| verifier.ensure(&body));

    if let Err(e) = verified {
        let status = if e.is_setup_failure() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::UNAUTHORIZED
        };
        tracing::warn!(%status, "rejecting slash command: {}", AppError::from(e));
        return status.into_response();
    }

    let command = match parse_slash_command(&body) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("{}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.command_service.dispatch(&command) {
        CommandReply::Message(text) => message_response(text),
        CommandReply::Ignored => StatusCode::OK.into_response(),
    }
}
