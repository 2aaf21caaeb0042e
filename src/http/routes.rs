//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::geometry::{Platform, PLATFORMS};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(state.config.client_origin.as_deref()))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/platforms", get(platforms_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Comma-separated origins; unset means any origin.
fn allowed_origins(client_origin: Option<&str>) -> AllowOrigin {
    match client_origin {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
                .collect();
            AllowOrigin::list(origins)
        }
        None => AllowOrigin::any(),
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    players: usize,
    connections: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        players: state.game.player_count(),
        connections: state.hub.len(),
    })
}

// ============================================================================
// World geometry
// ============================================================================

/// The platform list clients must render
async fn platforms_handler() -> Json<&'static [Platform]> {
    Json(PLATFORMS.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::{GameRunner, World};
    use crate::ws::ConnectionHub;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Instant;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let hub = Arc::new(ConnectionHub::default());
        let (_runner, handle) = GameRunner::new(World::new(1, Instant::now()), hub.clone());
        AppState::new(Config::default(), handle, hub)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = build_router(test_state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["players"], 0);
        assert_eq!(body["connections"], 0);
    }

    #[tokio::test]
    async fn platforms_match_the_course() {
        let (status, body) = get_json("/platforms").await;

        assert_eq!(status, StatusCode::OK);
        let platforms = body.as_array().expect("array");
        assert_eq!(platforms.len(), PLATFORMS.len());
        assert_eq!(platforms[1]["top"], 1.0);
        assert_eq!(platforms[1]["xMin"], -5.0);
    }
}
