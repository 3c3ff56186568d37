//! API handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use songdesk_core::{LogDate, LogRecord, SongPrompt, SongRequest, SongResponse, XLSX_CONTENT_TYPE};
use songdesk_logs::LogFile;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub date: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "composer": state.composer.name(),
        "composer_configured": state.composer.is_configured(),
        "orders_logged": state.stats.logged(),
        "log_failures": state.stats.failed(),
    })))
}

/// Intake: compose (stubbed), log one row, answer with lyrics and links
pub async fn generate_song(
    State(state): State<AppState>,
    Json(req): Json<SongRequest>,
) -> Response {
    let order_id = Uuid::new_v4();
    let prompt = SongPrompt::from_request(&req);
    debug!(%order_id, prompt = %prompt, "Built song prompt");

    let composed = state.composer.compose(&prompt).await;

    let mut record = LogRecord::from_request(&req);
    if let Ok(composition) = &composed {
        record = record
            .with_lyrics(&composition.lyrics)
            .with_links(&composition.song_urls);
    }
    record_order(&state, record).await;

    match composed {
        Ok(composition) => {
            info!(%order_id, style = %req.styles, "Song order accepted");
            Json(SongResponse {
                lyrics: composition.lyrics,
                song_urls: composition.song_urls,
            })
            .into_response()
        }
        Err(e) => {
            warn!(%order_id, composer = state.composer.name(), "Compose failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// Append off the async runtime; failures never reach the caller
async fn record_order(state: &AppState, record: LogRecord) {
    let log = state.log.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || log.record(&record)).await {
        error!("Order log task failed: {}", e);
    }
}

/// Admin: send back the spreadsheet for `?date=YYYY-MM-DD`
pub async fn download_excel(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let date: LogDate = match query.date.parse() {
        Ok(date) => date,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let log = state.log.clone();
    match tokio::task::spawn_blocking(move || log.read_file(&date)).await {
        Ok(Ok(Some(file))) => {
            info!(file = %file.name, bytes = file.bytes.len(), "Log download");
            file_response(file)
        }
        Ok(Ok(None)) => error_response(StatusCode::NOT_FOUND, "Log not found"),
        Ok(Err(e)) => {
            error!("Failed to read log for {}: {}", date, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read log")
        }
        Err(e) => {
            error!("Log read task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read log")
        }
    }
}

fn file_response(file: LogFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}
