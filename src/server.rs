//! Public HTTP API for the report catalog.
//!
//! Exposes the report store as a JSON API: a read-only browsing surface plus
//! token-gated upload and delete for the publishing operator.
//!
//! # Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | `GET`  | `/health` | none | Health check (returns version) |
//! | `GET`  | `/reports` | none | List all reports, newest first |
//! | `GET`  | `/reports/{slug}` | none | One report with its raw document body |
//! | `POST` | `/reports` | admin | Multipart upload of one `.mdx` document |
//! | `DELETE` | `/reports?filename=F` | admin | Remove a stored document |
//! | `GET`  | `/auth/check` | — | Report whether the presented capability is valid |
//!
//! The admin capability travels as `Authorization: Bearer <token>` or as an
//! `admin_session` cookie; the store's gate only ever sees the token string.
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "invalid_format", "message": "only .mdx files are accepted" } }
//! ```
//!
//! Error codes: `unauthorized` (401), `invalid_format` (400), `not_found`
//! (404), `storage_unavailable` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends can
//! consume the API directly.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::SharedSecretAuth;
use crate::config::Config;
use crate::models::{Report, ReportMetadata};
use crate::store::{ReportStore, StoreError};

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<ReportStore>,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind`, builds the report
/// store from `[store].root` and `[auth].token`, and serves until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());
    let store = Arc::new(ReportStore::new(
        &config.store.root,
        SharedSecretAuth::new(&config.auth.token),
    ));

    let state = AppState { config, store };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route(
            "/reports",
            get(handle_list_reports)
                .post(handle_upload)
                .delete(handle_delete),
        )
        .route("/reports/{slug}", get(handle_get_report))
        .route("/auth/check", get(handle_auth_check))
        .layer(cors)
        .with_state(state);

    tracing::info!(bind = %bind_addr, "report server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"invalid_format"`, `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match &err {
            StoreError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            StoreError::InvalidFormat(_) => (StatusCode::BAD_REQUEST, "invalid_format"),
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::StorageUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_unavailable")
            }
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "invalid_format".to_string(),
        message: message.into(),
    }
}

// ============ Capability extraction ============

/// Pulls the admin capability out of the request: `Authorization: Bearer`
/// first, then the `admin_session` cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some(value) = pair.trim().strip_prefix("admin_session=") {
            return Some(value.to_string());
        }
    }
    None
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /reports ============

/// One catalog entry as served to clients. `uploaded_at` is the document's
/// modification timestamp in ISO-8601.
#[derive(Serialize)]
struct ReportSummary {
    filename: String,
    slug: String,
    metadata: ReportMetadata,
    uploaded_at: String,
}

impl From<Report> for ReportSummary {
    fn from(report: Report) -> Self {
        let uploaded_at = format_ts_iso(&report);
        ReportSummary {
            filename: report.filename,
            slug: report.slug,
            metadata: report.metadata,
            uploaded_at,
        }
    }
}

#[derive(Serialize)]
struct ReportListResponse {
    reports: Vec<ReportSummary>,
}

/// Handler for `GET /reports`. Public; no capability required.
async fn handle_list_reports(
    State(state): State<AppState>,
) -> Result<Json<ReportListResponse>, AppError> {
    let reports = state.store.list()?;
    Ok(Json(ReportListResponse {
        reports: reports.into_iter().map(ReportSummary::from).collect(),
    }))
}

// ============ GET /reports/{slug} ============

/// JSON response body for `GET /reports/{slug}`: the catalog entry plus the
/// raw document body for detail rendering.
#[derive(Serialize)]
struct ReportDetailResponse {
    filename: String,
    slug: String,
    metadata: ReportMetadata,
    uploaded_at: String,
    body: String,
}

async fn handle_get_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ReportDetailResponse>, AppError> {
    let (report, body) = state.store.get_with_body(&slug)?;
    let uploaded_at = format_ts_iso(&report);
    Ok(Json(ReportDetailResponse {
        filename: report.filename,
        slug: report.slug,
        metadata: report.metadata,
        uploaded_at,
        body,
    }))
}

// ============ POST /reports ============

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    filename: String,
}

/// Handler for `POST /reports`.
///
/// Expects a multipart form with a `file` field carrying the document. The
/// store performs the authorization, extension, and sanitization checks;
/// this handler only unwraps the transport.
async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let token = session_token(&headers);

    let mut uploaded: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(format!("malformed multipart payload: {err}")))?
    {
        if field.name() == Some("file") {
            let name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| bad_request("file field must carry a filename"))?;
            let data = field
                .bytes()
                .await
                .map_err(|err| bad_request(format!("failed to read upload: {err}")))?;
            uploaded = Some((name, data.to_vec()));
        }
    }

    let (name, data) = uploaded.ok_or_else(|| bad_request("no file uploaded"))?;
    let filename = state.store.create(&name, &data, token.as_deref())?;

    Ok(Json(UploadResponse {
        success: true,
        filename,
    }))
}

// ============ DELETE /reports ============

#[derive(Deserialize)]
struct DeleteParams {
    filename: String,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: String,
}

/// Handler for `DELETE /reports?filename=F`.
async fn handle_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, AppError> {
    let token = session_token(&headers);
    state.store.delete(&params.filename, token.as_deref())?;

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("{} deleted successfully", params.filename),
    }))
}

// ============ GET /auth/check ============

#[derive(Serialize)]
struct AuthCheckResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<AuthUser>,
}

#[derive(Serialize)]
struct AuthUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// Handler for `GET /auth/check`. Reports whether the presented capability
/// is valid and, when it is, which operator identity the deployment is
/// configured with. Never fails; an absent or bad token is simply
/// `authenticated: false`.
async fn handle_auth_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AuthCheckResponse> {
    let token = session_token(&headers);
    if state.store.is_authorized(token.as_deref()) {
        Json(AuthCheckResponse {
            authenticated: true,
            user: Some(AuthUser {
                username: state.config.auth.username.clone(),
                email: state.config.auth.email.clone(),
            }),
        })
    } else {
        Json(AuthCheckResponse {
            authenticated: false,
            user: None,
        })
    }
}

fn format_ts_iso(report: &Report) -> String {
    report.modified_at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
