use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::sync::Arc;

use crate::dto::{ErrorResponse, SendEmailRequest};
use crate::service::EmailService;

#[debug_handler]
pub async fn send_email(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected send-email request: {rejection}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    match service.send_password_reset(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::error!("Failed to send email: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from graph mailer!").into_response()
}
