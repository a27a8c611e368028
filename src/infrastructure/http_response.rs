// HTTP response helpers for slash command acknowledgements
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SlackMessage<'a> {
    pub text: &'a str,
}

/// `200 application/json` with `{"text": message}`.
pub fn message_response(text: &str) -> Response {
    match serde_json::to_vec(&SlackMessage { text }) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode acknowledgement: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
