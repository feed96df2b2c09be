//! HTTP server: routes, handlers and the error envelope.
//!
//! - `POST /crop_recommendation/`: [`CropInput`] → `recommended_crop`
//! - `POST /fertilizer_recommendation/`: [`FertilizerInput`] →
//!   `recommended_fertilizer`
//! - `GET /health`: status, version and loaded artifacts
//!
//! Body validation failures answer 422 with one diagnostic per field.
//! Any failure after validation answers 500 with `{"detail": "Error: ..."}`.

#[cfg(feature = "server")]
pub mod config;
mod extract;

pub use extract::{ValidatedJson, validate_body};

use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::ErrorKind;
use crate::recommend::Recommender;
use crate::types::{
    CropInput, ErrorDetail, FertilizerInput, FieldError, HealthResponse, PredictionResponse,
};
use crate::{CropwiseError, Result};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub recommender: Recommender,
}

/// Build the application router around a recommender.
pub fn router(recommender: Recommender) -> Router {
    Router::new()
        .route("/crop_recommendation/", post(crop_recommendation))
        .route("/crop_recommendation", post(crop_recommendation))
        .route("/fertilizer_recommendation/", post(fertilizer_recommendation))
        .route("/fertilizer_recommendation", post(fertilizer_recommendation))
        .route("/health", get(health))
        .with_state(AppState { recommender })
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, recommender: Recommender) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    axum::serve(listener, router(recommender))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn crop_recommendation(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CropInput>,
) -> std::result::Result<Json<PredictionResponse>, ApiError> {
    let crop = state.recommender.recommend_crop(&input)?;
    Ok(Json(PredictionResponse::crop(crop)))
}

async fn fertilizer_recommendation(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<FertilizerInput>,
) -> std::result::Result<Json<PredictionResponse>, ApiError> {
    let fertilizer = state.recommender.recommend_fertilizer(&input)?;
    Ok(Json(PredictionResponse::fertilizer(fertilizer)))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
        artifacts: state.recommender.store().summary(),
    })
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be read, e.g. it exceeded the size limit.
    Unreadable(BytesRejection),
    /// The body did not match the request schema.
    Invalid(Vec<FieldError>),
    /// Translation or prediction failed.
    Failed(CropwiseError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreadable(_) | Self::Invalid(_) => ErrorKind::Validation,
            Self::Failed(err) => err.kind(),
        }
    }

    /// Anything that fails after the body validated is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unreadable(rejection) => rejection.status(),
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CropwiseError> for ApiError {
    fn from(err: CropwiseError) -> Self {
        Self::Failed(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(kind = ?self.kind(), %status, "request rejected");
        let body = match self {
            Self::Unreadable(rejection) => ErrorDetail::Message {
                detail: rejection.body_text(),
            },
            Self::Invalid(fields) => ErrorDetail::Fields { detail: fields },
            Self::Failed(err) => ErrorDetail::Message {
                detail: format!("Error: {err}"),
            },
        };
        (status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
