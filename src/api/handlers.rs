//! HTTP endpoint handlers

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{error, warn};

use crate::state::{AppState, TimerSnapshot};
use crate::timer::SettingsPatch;

use super::responses::HealthResponse;

/// Handle GET /state - the GET_STATE intent
pub async fn get_state_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerSnapshot>, StatusCode> {
    match state.snapshot() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to read snapshot: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - the TOGGLE_TIMER intent
///
/// A toggle after the run finished is a no-op; the caller sees it through
/// the snapshot's finished flag, not through an error status.
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerSnapshot>, StatusCode> {
    match state.toggle() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to toggle timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /settings - the UPDATE_SETTINGS intent
///
/// The body is a partial settings object. Unknown and non-numeric fields
/// are dropped, out-of-range values are clamped; a settings edit never
/// fails.
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<TimerSnapshot>, StatusCode> {
    let patch = SettingsPatch::from_value(&body);
    match state.update_settings(patch) {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to update settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle DELETE /state - the DELETE_ALL intent
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerSnapshot>, StatusCode> {
    match state.reset() {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to reset state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /events - change notification stream
///
/// Emits the current snapshot immediately, then every committed snapshot
/// as a server-sent event. Multiple popups can subscribe at once.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let initial = state.snapshot().ok();
    let rx = state.subscribe();

    let stream = stream::unfold((initial, rx), |(pending, mut rx)| async move {
        if let Some(snapshot) = pending {
            return Some((Ok(snapshot_event(&snapshot)), (None, rx)));
        }
        loop {
            match rx.recv().await {
                Ok(snapshot) => return Some((Ok(snapshot_event(&snapshot)), (None, rx))),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Only the latest snapshot matters to an observer
                    warn!("Snapshot stream lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn snapshot_event(snapshot: &TimerSnapshot) -> Event {
    match Event::default().json_data(snapshot) {
        Ok(event) => event,
        Err(e) => {
            warn!("Failed to encode snapshot event: {}", e);
            Event::default().data("{}")
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
