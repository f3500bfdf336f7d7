//! # Interakt AI Relay
//!
//! Entry point: loads configuration, sets up logging and metrics, builds the
//! shared webhook state and serves the HTTP endpoints.

pub mod config;
pub mod consts;
pub mod metric;
pub mod server;
pub mod services;
pub mod utils;
pub mod webhook;

use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = &*config::APP_CONFIG;

    // Initialize logging and metrics
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    let app_state = webhook::AppState::from_config(app_config)?;

    run_server(app_config, app_state).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

async fn run_server(
    app_config: &config::AppConfig,
    app_state: webhook::AppState,
) -> anyhow::Result<()> {
    let server_addr = (
        app_config.web_server_host.clone(),
        app_config.web_server_port,
    );
    logfire::info!(
        "Starting server on {host}:{port}",
        host = server_addr.0.clone(),
        port = server_addr.1 as i64
    );

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(app_state.clone())
            .state(web::types::PayloadConfig::new(consts::MAX_PAYLOAD_BYTES))
            .configure(webhook::routes::interakt)
            .service(server::index)
            .default_service(
                web::route()
                    .guard(web::guard::Not(web::guard::Get()))
                    .to(server::serve_not_found),
            )
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
