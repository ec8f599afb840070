use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::rpc::GatewayError;
use crate::state::AppState;
use crate::storage::StoreError;
use crate::validation::ValidationError;

mod rewards;
mod transactions;

pub fn router(state: AppState) -> Router {
    // CORS is open for web wallet access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let rewards_router = rewards::router().with_state(state.clone());
    let transactions_router = transactions::router().with_state(state.clone());
    Router::new()
        .route("/api/health", get(health_live))
        .route("/api/health/ready", get(health_ready))
        .nest("/api/rewards", rewards_router)
        .nest("/api/transactions", transactions_router)
        .layer(cors)
        .with_state(state)
}

async fn health_live() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Reward System API is running",
    })
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|err| ApiError::Unavailable(err.to_string()))?;

    let uptime = state.start_time.elapsed().as_secs();
    assert!(
        uptime <= 31_536_000,
        "Uptime exceeds one year without restart"
    );
    Ok(Json(ReadyResponse {
        status: "ready",
        uptime_seconds: uptime,
    }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    uptime_seconds: u64,
}

/// Handler-boundary error taxonomy. Every failure is mapped to a JSON
/// `{error}` body at the handler that produced it; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Reward already claimed for this action")]
    AlreadyClaimed,

    #[error("Invalid action or no reward set")]
    UnknownAction,

    #[error("A claim for this action is already being processed")]
    ClaimInProgress,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::AlreadyClaimed | Self::UnknownAction => {
                StatusCode::BAD_REQUEST
            }
            Self::ClaimInProgress => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) | Self::Gateway(GatewayError::Config(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Gateway(GatewayError::Upstream(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("HTTP error: {message}");
        } else {
            info!("HTTP error: {message}");
        }
        let body = Json(ErrorBody { error: message });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}
