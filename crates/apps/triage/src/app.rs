//! Shared request context and router

use axum::Router;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;

use mail::{ActionHandler, BackupStore, GmailCredentials, MailApi};

use crate::routes;

/// Context handed to every handler
///
/// Built once at startup; the provider client is shared read-only by all
/// requests for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub gmail: Arc<dyn MailApi>,
    pub actions: Arc<ActionHandler>,
    pub backups: Arc<BackupStore>,
    pub credentials: Arc<GmailCredentials>,
}

impl AppState {
    pub fn new(
        gmail: Arc<dyn MailApi>,
        credentials: GmailCredentials,
        backup_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            actions: Arc::new(ActionHandler::new(gmail.clone())),
            gmail,
            backups: Arc::new(BackupStore::new(backup_dir)),
            credentials: Arc::new(credentials),
        }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/emails/unfortunately/last-24h",
            get(routes::unfortunately_last_24h),
        )
        .route("/emails/unfortunately", get(routes::unfortunately))
        .route("/backup/unfortunately", post(routes::backup_unfortunately))
        .route("/api/search", get(routes::search))
        .route("/api/backup", post(routes::backup_selected))
        .route("/api/delete", post(routes::delete))
        .route("/auth/url", get(routes::auth_url))
        .route("/auth/google/callback", get(routes::auth_callback))
        .route("/health", get(routes::health))
        .with_state(state)
}
