use crate::state::AppState;
use crate::tick_loop::sync_timer;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use mission_core::{EventEnvelope, MissionEngine, MissionError, MissionParameters};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, "http://localhost:5173")
}

pub fn make_router_with_cors(state: AppState, cors_origin: &str) -> Router {
    let origin = cors_origin
        .parse::<axum::http::HeaderValue>()
        .unwrap_or_else(|_| axum::http::HeaderValue::from_static("http://localhost:5173"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/configure", post(configure_handler))
        .route("/api/v1/start", post(start_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .route("/api/v1/step", post(step_handler))
        .route("/api/v1/reset", post(reset_handler))
        .route("/api/v1/speed", post(speed_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub struct ApiError(MissionError);

impl From<MissionError> for ApiError {
    fn from(err: MissionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            MissionError::InvalidConfiguration { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MissionError::InvalidTransition { .. } | MissionError::OutOfRangeAdvance { .. } => {
                StatusCode::CONFLICT
            }
        };
        tracing::debug!(%status, error = %self.0, "request rejected");
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let mission = app_state.mission.lock();
    let engine = &mission.engine;
    Json(serde_json::json!({
        "phase": engine.phase(),
        "stage": engine.stage(),
        "stageIndex": engine.stage().index(),
        "stageTitle": engine.stage().title(),
        "currentPeriod": engine.current_period(),
        "missionDuration": engine.params().mission_duration,
        "timeUnit": engine.params().time_unit,
        "seed": engine.seed(),
        "contentVersion": mission.content_version,
        "tickIntervalMs": duration_ms(engine.tick_interval()),
        "canStep": engine.can_step(),
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let snapshot = app_state.mission.lock().engine.snapshot();
    match serde_json::to_string(&snapshot) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        ),
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRequest {
    pub tick_interval_ms: u64,
}

/// Run one engine transition under the lock, then realign the timer driver
/// and publish the emitted events before releasing it.
fn apply(
    app_state: &AppState,
    action: impl FnOnce(&mut MissionEngine) -> Result<Vec<EventEnvelope>, MissionError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut mission = app_state.mission.lock();
    let events = action(&mut mission.engine)?;
    sync_timer(app_state, &mut mission);
    let body = transition_body(&mission.engine, &events);
    let _ = app_state.event_tx.send(events);
    Ok(Json(body))
}

fn transition_body(engine: &MissionEngine, events: &[EventEnvelope]) -> serde_json::Value {
    serde_json::json!({
        "phase": engine.phase(),
        "currentPeriod": engine.current_period(),
        "tickIntervalMs": duration_ms(engine.tick_interval()),
        "events": events,
    })
}

fn duration_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

pub async fn configure_handler(
    State(app_state): State<AppState>,
    Json(params): Json<MissionParameters>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, |engine| engine.configure(params))
}

pub async fn start_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, MissionEngine::start)
}

pub async fn pause_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, MissionEngine::pause)
}

pub async fn resume_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, MissionEngine::resume)
}

pub async fn step_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, MissionEngine::step)
}

pub async fn reset_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, |engine| Ok(engine.reset()))
}

pub async fn speed_handler(
    State(app_state): State<AppState>,
    Json(request): Json<SpeedRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply(&app_state, |engine| {
        engine.set_tick_interval(Duration::from_millis(request.tick_interval_ms))?;
        Ok(Vec::new())
    })
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let mission = app_state.mission.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(1));
        heartbeat.tick().await; // discard the immediate first tick
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await;
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) => pending.extend(events),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if !pending.is_empty() {
                        let data = serde_json::to_string(&pending).unwrap_or_default();
                        pending.clear();
                        yield Ok(Event::default().data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let (phase, period) = {
                        let guard = mission.lock();
                        (guard.engine.phase(), guard.engine.current_period())
                    };
                    let hb = serde_json::json!({
                        "heartbeat": true,
                        "phase": phase,
                        "currentPeriod": period,
                    });
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
