//! # Blog API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::HttpServer;

mod admin;
mod app;
mod config;
mod handlers;
mod middleware;
mod routing;
mod serializers;
mod state;
mod telemetry;

use config::{AppConfig, Environment};
use routing::HostTable;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present; variables already set win.
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return Err(std::io::Error::other(e));
        }
    };

    telemetry::init_telemetry(&config.telemetry);

    if config.debug && config.environment == Environment::Prod {
        tracing::warn!("APP_DEBUG is enabled in production");
    }

    tracing::info!(
        "Starting Blog API Server on {}:{} (domain {})",
        config.host,
        config.port,
        config.hosts.domain
    );

    let state = AppState::new(&config).await;
    let hosts = HostTable::new(&config.hosts);

    HttpServer::new(move || app::build_app(state.clone(), hosts.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
