pub mod config;
pub mod dto;
pub mod handler;
pub mod mail;
pub mod service;
pub mod template;
pub mod token;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use service::EmailService;

pub fn build_router(service: Arc<EmailService>) -> Router {
    Router::new()
        .route("/send-email", post(handler::send_email))
        .route("/", get(handler::health_check))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}
