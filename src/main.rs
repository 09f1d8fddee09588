use graph_mailer::{build_router, config, service::EmailService};

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt().init();

    // Load config
    let cfg = config::load_config().expect("failed to locate or load config file");
    tracing::info!("Successfully loaded graph mailer config");
    tracing::debug!("Config: {:?}", cfg);

    // Setup service
    let service_ptr = Arc::new(EmailService::new(&cfg));

    // Setup router
    let router = build_router(service_ptr);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Failed to read local address");

    tracing::info!("Graph mailer starting, listening on {}", addr);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
