use super::domain::{FuelHistory, MaintenanceHistory, Vehicle, VehicleId};
use super::evaluator::{VehicleStatus, VehicleStatusEvaluator};
use super::overview::FleetOverview;
use super::source::{FleetSource, SourceError};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a presentation layer needs to show one vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleStatusReport {
    pub vehicle: Vehicle,
    pub maintenance: MaintenanceHistory,
    pub fuel: FuelHistory,
    pub status: VehicleStatus,
}

/// Loads records from a [`FleetSource`] and hands them to the evaluator.
pub struct VehicleStatusService<S> {
    source: Arc<S>,
    evaluator: VehicleStatusEvaluator,
}

impl<S> Clone for VehicleStatusService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            evaluator: self.evaluator,
        }
    }
}

impl<S> VehicleStatusService<S>
where
    S: FleetSource,
{
    pub fn new(source: Arc<S>, evaluator: VehicleStatusEvaluator) -> Self {
        Self { source, evaluator }
    }

    pub fn evaluator(&self) -> &VehicleStatusEvaluator {
        &self.evaluator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch vehicle, maintenance and fuel records in turn, then evaluate.
    ///
    /// Nothing is evaluated unless every fetch succeeded.
    pub async fn vehicle_status(
        &self,
        id: VehicleId,
        now: NaiveDateTime,
    ) -> Result<VehicleStatusReport, SourceError> {
        let vehicle = self
            .source
            .vehicle(id)
            .await
            .inspect_err(|err| warn!(vehicle_id = id, error = %err, "vehicle lookup failed"))?;
        let maintenance = self.source.maintenance(id).await.inspect_err(
            |err| warn!(vehicle_id = id, error = %err, "maintenance history unavailable"),
        )?;
        let fuel = self
            .source
            .fuel(id)
            .await
            .inspect_err(|err| warn!(vehicle_id = id, error = %err, "fuel history unavailable"))?;

        let status = self
            .evaluator
            .evaluate(&vehicle, Some(&maintenance), Some(&fuel), now);

        info!(
            vehicle_id = id,
            alerts = status.alerts.len(),
            maintenance_due = ?status.maintenance_due,
            "vehicle status evaluated"
        );

        Ok(VehicleStatusReport {
            vehicle,
            maintenance,
            fuel,
            status,
        })
    }

    pub async fn fleet_overview(&self, now: NaiveDateTime) -> Result<FleetOverview, SourceError> {
        let vehicles = self
            .source
            .vehicles()
            .await
            .inspect_err(|err| warn!(error = %err, "vehicle list unavailable"))?;
        let overview = FleetOverview::build(&vehicles, &self.evaluator, now);

        info!(
            vehicles = overview.counts.vehicles,
            needing_attention = overview.counts.needing_attention,
            "fleet overview built"
        );

        Ok(overview)
    }
}
