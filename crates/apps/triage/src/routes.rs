//! Route handlers
//!
//! Each handler validates its input, runs the blocking provider and
//! filesystem work on the blocking thread pool, and maps the outcome to JSON.

use anyhow::anyhow;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use mail::search::{UNFORTUNATELY_LAST_24H_QUERY, UNFORTUNATELY_QUERY};
use mail::{GmailAuth, MessageId, NormalizedMessage, TrashOutcome, fetch_messages};

use crate::app::AppState;
use crate::error::ApiError;
use crate::templates;

/// Label used for backups of user-selected messages
const SELECTED_LABEL: &str = "selected-emails";
/// Label used for backups of the `unfortunately` query
const UNFORTUNATELY_LABEL: &str = "unfortunately";

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub messages: Vec<NormalizedMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub count: usize,
    pub backup_file: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Entries are stored exactly as submitted
#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    emails: Vec<Value>,
}

/// Entries that are not strings count as failed deletions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    email_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Run blocking work off the async executor
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow!("Blocking task failed: {}", e)))?
}

async fn run_query(state: &AppState, query: String) -> Result<Vec<NormalizedMessage>, ApiError> {
    let gmail = state.gmail.clone();
    blocking(move || fetch_messages(gmail.as_ref(), &query).map_err(ApiError::Provider)).await
}

async fn save_backup<T>(
    state: &AppState,
    messages: Vec<T>,
    label: &'static str,
) -> Result<(usize, String), ApiError>
where
    T: Serialize + Send + 'static,
{
    let backups = state.backups.clone();
    blocking(move || {
        let path = backups
            .save(&messages, label)
            .map_err(ApiError::Filesystem)?;
        Ok((messages.len(), path.display().to_string()))
    })
    .await
}

async fn search_response(state: &AppState, query: &str) -> Result<Json<SearchResponse>, ApiError> {
    let messages = run_query(state, query.to_string()).await?;
    Ok(Json(SearchResponse {
        query: query.to_string(),
        count: messages.len(),
        messages,
    }))
}

/// `GET /emails/unfortunately/last-24h`
pub async fn unfortunately_last_24h(
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    search_response(&state, UNFORTUNATELY_LAST_24H_QUERY).await
}

/// `GET /emails/unfortunately`
pub async fn unfortunately(
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ApiError> {
    search_response(&state, UNFORTUNATELY_QUERY).await
}

/// `GET /api/search?q=<query>`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params
        .map_err(|e| ApiError::Validation(format!("Invalid query string: {}", e.body_text())))?;
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter 'q' is required".to_string()))?;
    search_response(&state, &query).await
}

/// `POST /api/backup` with `{emails: [...]}`
pub async fn backup_selected(
    State(state): State<AppState>,
    body: Result<Json<BackupRequest>, JsonRejection>,
) -> Result<Json<BackupResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid_body())?;

    let (count, backup_file) = save_backup(&state, request.emails, SELECTED_LABEL).await?;
    Ok(Json(BackupResponse {
        query: None,
        count,
        backup_file,
    }))
}

/// `POST /backup/unfortunately`
pub async fn backup_unfortunately(
    State(state): State<AppState>,
) -> Result<Json<BackupResponse>, ApiError> {
    let messages = run_query(&state, UNFORTUNATELY_QUERY.to_string()).await?;
    let (count, backup_file) = save_backup(&state, messages, UNFORTUNATELY_LABEL).await?;
    Ok(Json(BackupResponse {
        query: Some(UNFORTUNATELY_QUERY.to_string()),
        count,
        backup_file,
    }))
}

/// `POST /api/delete` with `{emailIds: [...]}`
///
/// Always succeeds once the body is valid; per-id failures only lower
/// the `deleted` count.
pub async fn delete(
    State(state): State<AppState>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<TrashOutcome>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::invalid_body())?;
    let total = request.email_ids.len();

    let mut ids = Vec::with_capacity(total);
    for value in request.email_ids {
        match value {
            Value::String(id) => ids.push(MessageId::from(id)),
            other => error!("Failed to delete email {}: id is not a string", other),
        }
    }

    let actions = state.actions.clone();
    let outcome = blocking(move || Ok(actions.trash_messages(&ids))).await?;
    Ok(Json(TrashOutcome {
        deleted: outcome.deleted,
        total,
    }))
}

/// `GET /auth/url`
pub async fn auth_url(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let auth = GmailAuth::new(&state.credentials)?;
    Ok(Json(json!({ "authUrl": auth.authorization_url() })))
}

/// `GET /auth/google/callback?code=<code>`
pub async fn auth_callback(
    State(state): State<AppState>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Ok(Query(params)) = params else {
        return Ok((StatusCode::BAD_REQUEST, "Invalid callback parameters").into_response());
    };
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        let message = match params.error {
            Some(reason) => format!("Authorization failed: {}", reason),
            None => "Missing authorization code".to_string(),
        };
        return Ok((StatusCode::BAD_REQUEST, message).into_response());
    };

    let auth = GmailAuth::new(&state.credentials)?;
    let tokens = blocking(move || auth.exchange_code(&code).map_err(ApiError::Provider)).await?;
    info!(
        "OAuth code exchanged (refresh token issued: {})",
        tokens.refresh_token.is_some()
    );

    Ok(Html(templates::authorization_success(tokens.refresh_token.as_deref())).into_response())
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::router;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use mail::{BackupStore, GmailCredentials, InMemoryMailApi};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        api: Arc<InMemoryMailApi>,
        backup_dir: PathBuf,
        _temp: TempDir,
    }

    fn credentials() -> GmailCredentials {
        GmailCredentials {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3005/auth/google/callback".to_string(),
            refresh_token: None,
        }
    }

    fn test_app_with(credentials: GmailCredentials) -> TestApp {
        let api = Arc::new(InMemoryMailApi::with_page_size(2));
        api.add_message("a", "t1", "Application update", "Unfortunately we have decided");
        api.add_message("b", "t2", "Interview", "We would like to invite you");
        api.add_message("c", "t3", "Re: role", "unfortunately the role is filled");

        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backups");
        let state = AppState::new(api.clone(), credentials, &backup_dir);

        TestApp {
            router: router(state),
            api,
            backup_dir,
            _temp: temp,
        }
    }

    fn test_app() -> TestApp {
        test_app_with(credentials())
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(router: &Router, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let app = test_app();

        for uri in ["/api/search", "/api/search?q="] {
            let (status, body) = get(&app.router, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                json(&body),
                json!({ "error": "Query parameter 'q' is required" })
            );
        }
        assert_eq!(app.api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_malformed_query_is_json_error() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(Request::get("/api/search?q=a&q=b").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query string"));
        assert_eq!(app.api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_search() {
        let app = test_app();

        let (status, body) = get(&app.router, "/api/search?q=interview").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["query"], "interview");
        assert_eq!(body["count"], 1);
        assert_eq!(body["messages"][0]["id"], "b");
        assert_eq!(body["messages"][0]["threadId"], "t2");
        assert_eq!(body["messages"][0]["subject"], "Interview");
    }

    #[tokio::test]
    async fn test_unfortunately_endpoints() {
        let app = test_app();

        let (status, body) = get(&app.router, "/emails/unfortunately").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["query"], "unfortunately");
        assert_eq!(body["count"], 2);
        assert_eq!(body["messages"][0]["id"], "a");
        assert_eq!(body["messages"][1]["id"], "c");

        let (status, body) = get(&app.router, "/emails/unfortunately/last-24h").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["query"], "unfortunately newer_than:24h");
    }

    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let app = test_app();
        app.api.fail_on("c");

        let (status, body) = get(&app.router, "/emails/unfortunately").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = json(&body)["error"].as_str().unwrap().to_string();
        assert!(error.contains("Failed to fetch message c"));
    }

    #[tokio::test]
    async fn test_backup_empty_selection() {
        let app = test_app();

        let (status, body) = post_json(&app.router, "/api/backup", r#"{"emails": []}"#).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["count"], 0);
        assert!(body.get("query").is_none());

        let path = PathBuf::from(body["backupFile"].as_str().unwrap());
        assert!(path.starts_with(&app.backup_dir));
        let backup: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(backup, json!({ "count": 0, "messages": [] }));
    }

    #[tokio::test]
    async fn test_backup_selection() {
        let app = test_app();
        let body = r#"{"emails": [{"id": "a", "threadId": "t1", "snippet": "Unfortunately", "subject": "Update"}]}"#;

        let (status, body) = post_json(&app.router, "/api/backup", body).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["count"], 1);

        let backup = BackupStore::load(Path::new(body["backupFile"].as_str().unwrap())).unwrap();
        assert_eq!(backup.messages[0].subject.as_deref(), Some("Update"));
        let name = PathBuf::from(body["backupFile"].as_str().unwrap());
        assert!(
            name.file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("selected-emails-")
        );
    }

    #[tokio::test]
    async fn test_backup_rejects_invalid_body() {
        let app = test_app();

        for body in [r#"{}"#, r#"{"emails": "a"}"#, r#"{"emails": null}"#, "not json"] {
            let (status, response) = post_json(&app.router, "/api/backup", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json(&response), json!({ "error": "Invalid request body" }));
        }
        assert!(!app.backup_dir.exists());
    }

    #[tokio::test]
    async fn test_backup_keeps_entries_verbatim() {
        let app = test_app();
        let body = r#"{"emails": [{"id": "a", "labelIds": ["INBOX"]}, {"id": "b", "threadId": "t", "labelIds": []}]}"#;

        let (status, response) = post_json(&app.router, "/api/backup", body).await;
        assert_eq!(status, StatusCode::OK);
        let response = json(&response);
        assert_eq!(response["count"], 2);

        let path = PathBuf::from(response["backupFile"].as_str().unwrap());
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "count": 2,
                "messages": [
                    { "id": "a", "labelIds": ["INBOX"] },
                    { "id": "b", "threadId": "t", "labelIds": [] },
                ],
            })
        );
    }

    #[tokio::test]
    async fn test_backup_unfortunately() {
        let app = test_app();

        let (status, body) = send(
            &app.router,
            Request::post("/backup/unfortunately").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["query"], "unfortunately");
        assert_eq!(body["count"], 2);

        let backup = BackupStore::load(Path::new(body["backupFile"].as_str().unwrap())).unwrap();
        assert_eq!(backup.count, 2);
    }

    #[tokio::test]
    async fn test_delete_tolerates_partial_failure() {
        let app = test_app();
        app.api.fail_on("b");

        let (status, body) =
            post_json(&app.router, "/api/delete", r#"{"emailIds": ["a", "b", "c"]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({ "deleted": 2, "total": 3 }));
        assert_eq!(app.api.trashed(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_counts_non_string_ids_as_failures() {
        let app = test_app();

        let (status, body) =
            post_json(&app.router, "/api/delete", r#"{"emailIds": ["a", 5, null, "c"]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({ "deleted": 2, "total": 4 }));
        assert_eq!(app.api.trash_calls(), 2);
        assert_eq!(app.api.trashed(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_rejects_invalid_body() {
        let app = test_app();

        for body in [r#"{}"#, r#"{"emailIds": "a"}"#, r#"{"ids": ["a"]}"#] {
            let (status, response) = post_json(&app.router, "/api/delete", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json(&response), json!({ "error": "Invalid request body" }));
        }
        assert_eq!(app.api.trash_calls(), 0);
    }

    #[tokio::test]
    async fn test_auth_url() {
        let app = test_app();

        let (status, body) = get(&app.router, "/auth/url").await;
        assert_eq!(status, StatusCode::OK);
        let url = json(&body)["authUrl"].as_str().unwrap().to_string();
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("access_type=offline"));
    }

    #[tokio::test]
    async fn test_auth_url_configuration_error() {
        let app = test_app_with(GmailCredentials::default());

        let (status, body) = get(&app.router, "/auth/url").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = json(&body)["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Missing Google OAuth env vars"));
    }

    #[tokio::test]
    async fn test_callback_requires_code() {
        // Empty credentials would fail construction, so a 400 here proves
        // the request never reached the token exchange
        let app = test_app_with(GmailCredentials::default());

        let response = app
            .router
            .clone()
            .oneshot(Request::get("/auth/google/callback").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Missing authorization code");

        let (status, body) = get(&app.router, "/auth/google/callback?error=access_denied").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Authorization failed: access_denied");

        let (status, body) = get(&app.router, "/auth/google/callback?code=a&code=b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid callback parameters");
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = get(&app.router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), json!({ "status": "ok" }));
    }
}
