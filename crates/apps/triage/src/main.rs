//! Triage - a small Gmail search, backup and cleanup service
//!
//! This is the main entry point for the Triage HTTP server.

use anyhow::{Context, Result};
use log::{error, info, warn};
use mail::GmailCredentials;
use std::process::ExitCode;
use std::sync::Arc;

mod app;
mod error;
mod routes;
mod settings;
mod templates;

use app::AppState;
use settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    config::load_dotenv();
    let settings = Settings::from_env()?;

    let credentials = GmailCredentials::load()?;
    let gmail = mail::authorize(&credentials).inspect_err(|_| {
        if let Some(path) = GmailCredentials::default_credentials_path() {
            warn!(
                "To configure Gmail access, either:\n\
                 1. Set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI\n\
                 2. Or place your Google OAuth credentials at: {}",
                path.display()
            );
        }
    })?;
    if !gmail.auth().has_refresh_token() {
        warn!("GMAIL_REFRESH_TOKEN is not set; open /auth/url to authorize Gmail access");
    }

    let state = AppState::new(Arc::new(gmail), credentials, &settings.backup_dir);
    let app = app::router(state);

    let addr = settings.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API listening on http://{}", addr);
    info!("Backups are written to {}", settings.backup_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
