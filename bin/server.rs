// Carrier Profile Pipeline - Web Server
// REST API with Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use carrier_profile::{
    open_database, Config, Load, OnboardingFlow, ProfileStore, RawInput,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<Config>,
}

impl AppState {
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

/// POST /api/onboard body
#[derive(Deserialize)]
struct OnboardRequest {
    inputs: Vec<RawInput>,
    carrier_name: Option<String>,
    carrier_mc: Option<String>,
}

/// POST /api/carriers/:id/matches body
#[derive(Deserialize)]
struct MatchRequest {
    loads: Vec<Load>,
    limit: Option<usize>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok(serde_json::json!({
        "status": "OK",
        "version": carrier_profile::VERSION,
    }))
}

/// POST /api/onboard - Run an upload through the pipeline
async fn onboard(State(state): State<AppState>, Json(request): Json<OnboardRequest>) -> Response {
    if request.inputs.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "No inputs provided");
    }

    let conn = state.conn();
    let flow = OnboardingFlow::from_config(Some(&*conn), &state.config);
    let report = flow.process_upload(
        &request.inputs,
        request.carrier_name.as_deref(),
        request.carrier_mc.as_deref(),
    );

    if report.profile.is_none() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, report.errors.join("; "));
    }
    info!(carrier_id = %report.carrier_id, "onboarded carrier");
    ApiResponse::ok(report)
}

/// GET /api/carriers/:id/profile - Stored profile
async fn get_profile(State(state): State<AppState>, Path(carrier_id): Path<String>) -> Response {
    let conn = state.conn();
    match conn.load_profile(&carrier_id) {
        Ok(Some(profile)) => ApiResponse::ok(profile),
        Ok(None) => failure(StatusCode::NOT_FOUND, format!("Carrier not found: {}", carrier_id)),
        Err(e) => {
            error!(carrier_id = %carrier_id, error = %e, "failed to load profile");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/carriers/:id/status - Onboarding completeness
async fn get_status(State(state): State<AppState>, Path(carrier_id): Path<String>) -> Response {
    let conn = state.conn();
    let flow = OnboardingFlow::from_config(Some(&*conn), &state.config);
    match flow.onboarding_status(&carrier_id) {
        Ok(status) => ApiResponse::ok(status),
        Err(e) => {
            error!(carrier_id = %carrier_id, error = %e, "failed to read status");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /api/carriers/:id/matches - Rank candidate loads
async fn get_matches(
    State(state): State<AppState>,
    Path(carrier_id): Path<String>,
    Json(request): Json<MatchRequest>,
) -> Response {
    let conn = state.conn();
    let exists = match conn.load_profile(&carrier_id) {
        Ok(profile) => profile.is_some(),
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    if !exists {
        return failure(StatusCode::NOT_FOUND, format!("Carrier not found: {}", carrier_id));
    }

    let flow = OnboardingFlow::from_config(Some(&*conn), &state.config);
    let limit = request.limit.unwrap_or(state.config.match_limit);
    match flow.generate_matches(&carrier_id, request.loads, limit) {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => {
            error!(carrier_id = %carrier_id, error = %e, "failed to generate matches");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    println!("🌐 Carrier Profile Pipeline - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = open_database(&config.database_path)?;
    println!("✓ Database opened: {}", config.database_path);

    let addr = config.bind_address();
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        config: Arc::new(config),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/onboard", post(onboard))
        .route("/carriers/:id/profile", get(get_profile))
        .route("/carriers/:id/status", get(get_status))
        .route("/carriers/:id/matches", post(get_matches))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/health", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
