use chrono::NaiveDate;
use fleet_status::config::{AppConfig, SourceConfig};
use fleet_status::error::AppError;
use fleet_status::fleet::{
    parse_flexible_date, ConfiguredFleetSource, VehicleStatusEvaluator, VehicleStatusService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type FleetService = VehicleStatusService<ConfiguredFleetSource>;

/// Wire the configured source into a status service. A fixture path given on
/// the command line replaces whatever the environment selected.
pub(crate) fn build_service(
    config: &AppConfig,
    fixture: Option<PathBuf>,
) -> Result<FleetService, AppError> {
    let source_config = match fixture {
        Some(path) => SourceConfig::Fixture { path },
        None => config.source.clone(),
    };
    let source = ConfiguredFleetSource::from_config(&source_config)?;
    let evaluator = VehicleStatusEvaluator::new(config.evaluation.service_interval_km);
    Ok(VehicleStatusService::new(Arc::new(source), evaluator))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or DD.MM.YYYY"))
}
