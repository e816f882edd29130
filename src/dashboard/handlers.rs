//! HTTP handlers for the dashboard.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use futures_util::stream::StreamExt;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_util::io::ReaderStream;

use super::api::{FileQuery, StatsResponse};
use super::error::ApiError;
use super::render::{render_dashboard, render_file_view};
use super::state::AppState;
use crate::index::{FileDescriptor, SnapshotReader, TreeNode};

/// GET / - Redirect to the dashboard.
pub async fn redirect_root() -> Redirect {
    Redirect::to("/logs")
}

/// GET /logs - HTML tree of all indexed logs.
pub async fn get_dashboard(State(state): State<AppState>) -> Html<String> {
    let reader = &state.reader;
    Html(render_dashboard(
        reader.root(),
        &reader.current_tree(),
        reader.stats(),
        reader.is_ready(),
        state.with_assets,
    ))
}

/// GET /logs/view?file= - HTML page with the file's contents.
pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Html<String>, ApiError> {
    let requested = query.path().ok_or_else(ApiError::missing_file)?;
    let path = resolve(&state, requested).await?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read log file");
        ApiError::read_failed()
    })?;
    let contents = String::from_utf8_lossy(&bytes);

    Ok(Html(render_file_view(&path, &contents, state.with_assets)))
}

/// GET /logs/download?file= - Stream the file as an attachment.
pub async fn get_download(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let requested = query.path().ok_or_else(ApiError::missing_file)?;
    let path = resolve(&state, requested).await?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open log file");
        ApiError::read_failed()
    })?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (header::CONTENT_DISPOSITION, content_disposition(&path)),
    ];
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((headers, body).into_response())
}

/// GET /logs/stream - SSE feed of the flattened file list.
///
/// Pushes immediately on connect, then once per stream interval. The feed
/// ends when the server shuts down.
pub async fn get_stream(
    State(state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let reader = state.reader.clone();
    let mut interval = tokio::time::interval(state.stream_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let stream = IntervalStream::new(interval)
        .then(move |_| file_list_event(reader.clone()))
        .take_until(state.cancel.clone().cancelled_owned());

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/tree - JSON tree.
pub async fn get_tree(State(state): State<AppState>) -> Json<Vec<TreeNode>> {
    Json(state.reader.current_tree())
}

/// GET /api/files - JSON flattened file list.
pub async fn get_files(State(state): State<AppState>) -> Json<Vec<FileDescriptor>> {
    Json(state.reader.flatten_files())
}

/// GET /api/stats - Index counters.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let reader = &state.reader;
    Json(StatsResponse::new(
        reader.is_ready(),
        reader.root().to_path_buf(),
        reader.stats(),
    ))
}

/// Validate the requested path off the async runtime.
/// One SSE event carrying the flattened file list.
///
/// The tree walk runs on the blocking pool. If it fails the client gets a
/// comment line and keeps its previous list.
async fn file_list_event(reader: SnapshotReader) -> Result<Event, Infallible> {
    match tokio::task::spawn_blocking(move || reader.flatten_files()).await {
        Ok(files) => {
            let data = serde_json::to_string(&files).unwrap_or_else(|_| "[]".to_string());
            Ok(Event::default().data(data))
        }
        Err(e) => {
            tracing::error!(error = %e, "File list snapshot failed");
            Ok(Event::default().comment("file list unavailable"))
        }
    }
}

async fn resolve(state: &AppState, requested: PathBuf) -> Result<PathBuf, ApiError> {
    let reader = state.reader.clone();
    let resolved = tokio::task::spawn_blocking(move || reader.resolve_file(&requested))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Path resolution task failed");
            ApiError::read_failed()
        })?;

    resolved.map_err(|e| {
        tracing::debug!(error = %e, "Rejected file request");
        ApiError::from(e)
    })
}

/// `attachment` disposition with a header-safe file name.
fn content_disposition(path: &Path) -> String {
    let name: String = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{name}\"")
}
