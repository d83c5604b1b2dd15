use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::convert::ConversionError;
use crate::llm::prompt::{TableSummary, EXAMPLE_QUESTIONS, SCHEMA_DESCRIPTION, SCHEMA_TABLES};
use crate::llm::ModelStatus;
use crate::session::{HistoryEntry, SessionError, SessionId};
use crate::web::state::AppState;

// Conversion types

#[derive(Debug, Deserialize, Clone)]
pub struct ConvertRequest {
    pub session_id: SessionId,
    pub question: String,
    #[serde(default = "default_save_history")]
    pub save_history: bool,
}

fn default_save_history() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub sql: String,
    pub model: String,
    pub saved: bool,
}

// Session types

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub question: String,
    pub sql_query: String,
    pub timestamp: String,
}

impl From<&HistoryEntry> for HistoryItem {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            question: entry.question.clone(),
            sql_query: entry.sql_query.clone(),
            timestamp: entry.display_timestamp(),
        }
    }
}

// Schema

#[derive(Debug, Serialize)]
pub struct SchemaInfo {
    pub description: &'static str,
    pub tables: &'static [TableSummary],
    pub examples: &'static [&'static str],
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub session_count: usize,
    pub max_question_length: usize,
    pub model: ModelStatus,
}

/// Error body the UI switches on by `category`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub category: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, category: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            category,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ConversionError> for ApiError {
    fn from(e: ConversionError) -> Self {
        let status = match &e {
            ConversionError::SensitiveKeyword
            | ConversionError::QueryTooLong { .. }
            | ConversionError::Validation(_)
            | ConversionError::ContentBlocked => StatusCode::UNPROCESSABLE_ENTITY,
            ConversionError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ConversionError::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
            ConversionError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ConversionError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ConversionError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError::new(status, e.category(), e.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, "session_not_found", e.to_string())
    }
}

// API Implementations

pub async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.sessions.end(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Natural language to SQL conversion
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    if !state.sessions.contains(payload.session_id).await {
        return Err(SessionError::NotFound(payload.session_id).into());
    }

    if payload.question.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "empty_question",
            "Please enter a question",
        ));
    }

    debug!("Converting question: {}", payload.question);

    // Input rejections must not depend on whether a model is connected
    state.converter.screen(&payload.question)?;

    let generator = state.llm_manager.generator().await.map_err(|e| {
        warn!("Conversion requested without a model: {}", e);
        ConversionError::from(e)
    })?;

    let query = state
        .converter
        .convert(&payload.question, generator.as_ref())
        .await?;

    let saved = if payload.save_history {
        let entry = HistoryEntry::record(&payload.question, &query);
        match state.sessions.append(payload.session_id, entry).await {
            Ok(count) => {
                info!("Saved to history ({} entries)", count);
                true
            }
            Err(e) => {
                error!("Failed to save history: {}", e);
                false
            }
        }
    } else {
        false
    };

    Ok(Json(ConvertResponse {
        sql: query.sql().to_string(),
        model: query.model().to_string(),
        saved,
    }))
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    let entries = state.sessions.list(session_id).await?;
    Ok(Json(entries.iter().map(HistoryItem::from).collect()))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.sessions.clear(session_id).await?;
    info!("History cleared for session {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_schema() -> Json<SchemaInfo> {
    Json(SchemaInfo {
        description: SCHEMA_DESCRIPTION,
        tables: &SCHEMA_TABLES,
        examples: &EXAMPLE_QUESTIONS,
    })
}

// Manual retry of model selection
pub async fn reconnect_model(State(state): State<Arc<AppState>>) -> Json<ModelStatus> {
    Json(state.llm_manager.reconnect().await)
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        session_count: state.sessions.len().await,
        max_question_length: state.converter.max_question_length(),
        model: state.llm_manager.status().await,
    })
}
