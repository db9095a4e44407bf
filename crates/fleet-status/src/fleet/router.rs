use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{FuelHistory, MaintenanceHistory, Vehicle, VehicleId};
use super::service::VehicleStatusService;
use super::source::{FleetSource, SourceError};

/// Optional evaluation date; defaults to the current local time.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationQuery {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Caller-supplied records to evaluate without touching the backend.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub maintenance: Option<MaintenanceHistory>,
    #[serde(default)]
    pub fuel: Option<FuelHistory>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Router exposing fleet overview and vehicle status endpoints.
pub fn fleet_router<S>(service: Arc<VehicleStatusService<S>>) -> Router
where
    S: FleetSource + 'static,
{
    Router::new()
        .route("/api/v1/fleet", get(overview_handler::<S>))
        .route("/api/v1/vehicles/status", post(evaluate_handler::<S>))
        .route(
            "/api/v1/vehicles/:vehicle_id/status",
            get(status_handler::<S>),
        )
        .with_state(service)
}

/// `today` at midnight, or the current local time when no date was given.
pub fn evaluation_instant(today: Option<NaiveDate>) -> NaiveDateTime {
    match today {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    }
}

pub(crate) async fn overview_handler<S>(
    State(service): State<Arc<VehicleStatusService<S>>>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    S: FleetSource + 'static,
{
    match service.fleet_overview(evaluation_instant(query.today)).await {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => source_failure(err),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<VehicleStatusService<S>>>,
    Path(vehicle_id): Path<VehicleId>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    S: FleetSource + 'static,
{
    match service
        .vehicle_status(vehicle_id, evaluation_instant(query.today))
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => source_failure(err),
    }
}

pub(crate) async fn evaluate_handler<S>(
    State(service): State<Arc<VehicleStatusService<S>>>,
    Json(request): Json<EvaluateRequest>,
) -> Response
where
    S: FleetSource + 'static,
{
    let status = service.evaluator().evaluate(
        &request.vehicle,
        request.maintenance.as_ref(),
        request.fuel.as_ref(),
        evaluation_instant(request.today),
    );
    (StatusCode::OK, Json(status)).into_response()
}

fn source_failure(err: SourceError) -> Response {
    match err {
        SourceError::NotFound(id) => {
            let payload = json!({
                "error": "vehicle not found",
                "vehicle_id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "fleet data unavailable");
            let payload = json!({
                "error": "fleet data is temporarily unavailable",
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}
