use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use mergington::errors::Report;
use mergington::log;

mod catalog;
mod config;
mod error;
mod handlers;
mod routes;
mod services;

use config::Config;
use services::ActivityServiceInMemory;

/// State shared by every request handler.
pub struct AppState {
    pub activities: ActivityServiceInMemory,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(activities: ActivityServiceInMemory) -> Self {
        Self {
            activities,
            started_at: chrono::Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    // Setup logging
    mergington::log::setup()?;

    let config = Config::parse();

    // Seed the activity catalog
    let catalog = match &config.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::builtin(),
    };
    let activities = ActivityServiceInMemory::with_policy(catalog, config.policy());
    log::info!(
        "Serving {} activities with {:?}",
        activities.activity_count(),
        activities.policy()
    );

    // Setup the routes
    let state = Arc::new(AppState::new(activities));
    let app = routes::setup_routes(state, &config.static_dir);

    // Setup the server
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    log::info!("Starting server on http://{}", listener.local_addr()?);
    log::info!("Press Ctrl+C to stop the server");

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down server");

    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                log::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Signal received, starting graceful shutdown");
}
