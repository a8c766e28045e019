//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{DomainError, OccupancyReading, ShuttleId, parse_departure_time};
use crate::planner::{OptimizeRequest, PlanError, PlanRequest, Planner};
use crate::provider::{NetworkProvider, ProviderError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops))
        .route("/routes/plan", get(plan_routes))
        .route("/routes/optimize", get(optimize_routes))
        .route("/occupancy", post(record_occupancy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every stop in the network.
async fn list_stops(State(state): State<AppState>) -> Result<Json<Vec<StopResult>>, AppError> {
    let stops = state.network.stops().await.map_err(PlanError::from)?;
    Ok(Json(stops.iter().map(StopResult::from_stop).collect()))
}

/// Every feasible itinerary within the transfer bound.
async fn plan_routes(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlanResponse>, AppError> {
    let request = PlanRequest::parse(
        &query.from,
        &query.to,
        query.departure_time.as_deref(),
        query.max_transfers,
        &state.config,
    )?;

    let planner = Planner::new(&*state.network, &state.config);
    let itineraries = planner.plan_itineraries(&request).await?;

    Ok(Json(PlanResponse::from_itineraries(&itineraries)))
}

/// The K best itineraries by time, cost and crowding.
async fn optimize_routes(
    State(state): State<AppState>,
    Query(query): Query<OptimizeQuery>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let request = OptimizeRequest::parse(
        &query.from,
        &query.to,
        query.departure_time.as_deref(),
        query.k,
        query.max_transfers,
        &state.config,
    )?;

    let planner = Planner::new(&*state.network, &state.config);
    let result = planner.optimize_itineraries(&request).await?;

    Ok(Json(OptimizeResponse::from_optimized(&result)))
}

/// Accept an occupancy count from a shuttle.
async fn record_occupancy(
    State(state): State<AppState>,
    Json(update): Json<OccupancyUpdate>,
) -> Result<StatusCode, AppError> {
    let shuttle_id = ShuttleId::parse(&update.shuttle_id).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    if update.capacity == 0 {
        return Err(AppError::BadRequest {
            message: DomainError::ZeroCapacity(shuttle_id).to_string(),
        });
    }
    if update.occupied_seats > update.capacity {
        return Err(AppError::BadRequest {
            message: format!(
                "occupied seats {} exceed capacity {}",
                update.occupied_seats, update.capacity
            ),
        });
    }

    let recorded_at = match update.recorded_at.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => parse_departure_time(s).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => Local::now().naive_local(),
    };

    state
        .network
        .record_occupancy(OccupancyReading {
            shuttle_id,
            occupied_seats: update.occupied_seats,
            capacity: update.capacity,
            recorded_at,
        })
        .await
        .map_err(|e| match e {
            ProviderError::Invalid(DomainError::UnknownShuttle(id)) => AppError::NotFound {
                message: format!("shuttle {id} not found"),
            },
            other => AppError::from(PlanError::from(other)),
        })?;

    info!(shuttle = %update.shuttle_id, occupied = update.occupied_seats, "Occupancy recorded");
    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::InvalidArgument(message) => AppError::BadRequest { message },
            PlanError::UpstreamData(_) => AppError::BadGateway {
                message: e.to_string(),
            },
            PlanError::Internal(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "invalid_argument",
            AppError::NotFound { .. } => "not_found",
            AppError::BadGateway { .. } => "upstream_data",
            AppError::Internal { .. } => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error = self.kind();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::BadGateway { message }
            | AppError::Internal { message } => message,
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error, message });
        (status, body).into_response()
    }
}
