//! HTTP route definitions
//!
//! Read-only surface: process health plus occupancy/world snapshots. No
//! mutation path into the simulation exists here.

use axum::{
    extract::State,
    http::{header, HeaderMap, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;
use crate::ws::protocol::{GameStatus, WorldSnapshot};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS: comma-separated allow-list from CLIENT_ORIGIN, permissive
    // when unset (development default)
    let cors = match &state.config.client_origin {
        Some(origins) => {
            let allowed: Vec<header::HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .route("/", get(status_handler))
        .route("/health", get(health_handler))
        .route("/api/game-state", get(game_state_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Status endpoints
// ============================================================================

#[derive(Serialize)]
struct PlayersSummary {
    player1: bool,
    player2: bool,
    total: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
    timestamp: String,
    socket: String,
    players: PlayersSummary,
    game_status: GameStatus,
}

async fn status_handler(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusResponse> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.server_addr.to_string());

    let occupancy = &state.room.occupancy;
    Json(StatusResponse {
        status: "online",
        message: "Fight server running",
        timestamp: chrono::Utc::now().to_rfc3339(),
        socket: format!("wss://{}", host),
        players: PlayersSummary {
            player1: occupancy.player1_connected(),
            player2: occupancy.player2_connected(),
            total: occupancy.player_total(),
        },
        game_status: occupancy.game_status(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: u64,
    timestamp: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime: uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameStateResponse {
    players: OccupancySummary,
    game_state: WorldSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OccupancySummary {
    player1_connected: bool,
    player2_connected: bool,
    total: u32,
}

async fn game_state_handler(State(state): State<AppState>) -> Json<GameStateResponse> {
    let occupancy = &state.room.occupancy;
    let snapshot = state.room.snapshot_rx.borrow().clone();

    Json(GameStateResponse {
        players: OccupancySummary {
            player1_connected: occupancy.player1_connected(),
            player2_connected: occupancy.player2_connected(),
            total: occupancy.player_total(),
        },
        game_state: snapshot,
    })
}
