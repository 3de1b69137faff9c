// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the REST API.
//!
//! Handles GET/POST /state, POST /comm, GET /history, GET /health, and the
//! front-end index at GET /.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use krzys_core::types::{
    EntryKind, HealthStatus, HistoryContent, HistoryEntry, HistoryQuery, Speaker, StatusChanges,
    StatusRecord,
};
use krzys_core::KrzysError;

use crate::server::AppState;

/// Query string of POST /comm.
#[derive(Debug, Deserialize)]
pub struct CommParams {
    /// Speaker code: 0 = krzys, 1 = user.
    #[serde(default = "default_who")]
    pub who: i64,
}

fn default_who() -> i64 {
    1
}

/// Request body for POST /comm.
#[derive(Debug, Deserialize)]
pub struct CommRequest {
    pub message: String,
}

/// Response body for POST /comm.
#[derive(Debug, Serialize)]
pub struct CommResponse {
    /// Always `"saved"`.
    pub status: String,
    pub who: Speaker,
    pub ts: String,
}

/// Query string of GET /history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub kind: Option<String>,
}

/// Response body for GET /history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub items: Vec<HistoryEntry>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded`, or `unhealthy`.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Reason for a non-ok status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An error rendered as `{"error": ...}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<KrzysError> for ApiError {
    fn from(err: KrzysError) -> Self {
        match err {
            KrzysError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            KrzysError::NotFound(what) => Self::new(StatusCode::NOT_FOUND, format!("{what} not found")),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// GET /state
pub async fn get_state(State(state): State<AppState>) -> Result<Json<StatusRecord>, ApiError> {
    Ok(Json(state.status.current().await?))
}

/// POST /state
///
/// Applies a partial update. Absent fields keep their value.
pub async fn post_state(
    State(state): State<AppState>,
    payload: Result<Json<StatusChanges>, JsonRejection>,
) -> Result<Json<StatusRecord>, ApiError> {
    let Json(changes) = payload?;
    let updated = state.status.apply_update(changes).await?;
    Ok(Json(updated))
}

/// POST /comm?who={0,1}
///
/// Records a message from either party. `who` defaults to the user.
pub async fn post_comm(
    State(state): State<AppState>,
    params: Result<Query<CommParams>, QueryRejection>,
    payload: Result<Json<CommRequest>, JsonRejection>,
) -> Result<Json<CommResponse>, ApiError> {
    let Query(params) = params?;
    let who = Speaker::from_code(params.who)?;
    let Json(body) = payload?;

    let ts = state
        .history
        .append(EntryKind::Comm, Some(who), HistoryContent::message(body.message))
        .await?;

    Ok(Json(CommResponse {
        status: "saved".to_string(),
        who,
        ts,
    }))
}

/// GET /history?limit=n&kind=state|comm
///
/// Newest entries first.
pub async fn get_history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(params) = params?;
    let query = HistoryQuery::from_params(params.limit, params.kind.as_deref())?;
    let items = state.history.query(&query).await?;
    Ok(Json(HistoryResponse {
        count: items.len(),
        items,
    }))
}

/// GET /health
///
/// 200 while storage is healthy or degraded, 503 otherwise.
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                Some(e.to_string()),
            )
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
            detail,
        }),
    )
}

/// GET /
///
/// Serves `index.html` from the front-end directory.
pub async fn index(State(state): State<AppState>) -> Response {
    let Some(dir) = &state.frontend_dir else {
        return ApiError::new(StatusCode::NOT_FOUND, "Frontend index not found").into_response();
    };
    match tokio::fs::read_to_string(dir.join("index.html")).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "front-end index unavailable");
            ApiError::new(StatusCode::NOT_FOUND, "Frontend index not found").into_response()
        }
    }
}
