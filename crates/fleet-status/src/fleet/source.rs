use super::domain::{FuelHistory, MaintenanceHistory, Vehicle, VehicleId};
use crate::config::SourceConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Failures raised while retrieving fleet records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("vehicle {0} not found")]
    NotFound(VehicleId),
    #[error("fleet backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fleet backend responded with HTTP {status} for {path}")]
    Status { status: u16, path: String },
    #[error("could not decode fleet data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not read fleet fixture {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read access to the fleet backend.
///
/// Implementations return records exactly as the backend supplied them.
pub trait FleetSource: Send + Sync {
    fn vehicles(&self) -> impl Future<Output = Result<Vec<Vehicle>, SourceError>> + Send;

    fn vehicle(&self, id: VehicleId)
        -> impl Future<Output = Result<Vehicle, SourceError>> + Send;

    fn maintenance(
        &self,
        id: VehicleId,
    ) -> impl Future<Output = Result<MaintenanceHistory, SourceError>> + Send;

    fn fuel(&self, id: VehicleId) -> impl Future<Output = Result<FuelHistory, SourceError>> + Send;
}

/// Client for the REST endpoints exposed by the fleet backend.
#[derive(Debug, Clone)]
pub struct HttpFleetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFleetSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        vehicle: Option<VehicleId>,
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting fleet data");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = vehicle {
                return Err(SourceError::NotFound(id));
            }
        }

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "fleet backend returned an error status");
            return Err(SourceError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl FleetSource for HttpFleetSource {
    async fn vehicles(&self) -> Result<Vec<Vehicle>, SourceError> {
        let vehicles: Option<Vec<Vehicle>> = self.get_json("/vehicles", None).await?;
        Ok(vehicles.unwrap_or_default())
    }

    async fn vehicle(&self, id: VehicleId) -> Result<Vehicle, SourceError> {
        self.get_json(&format!("/vehicle/{id}"), Some(id)).await
    }

    async fn maintenance(&self, id: VehicleId) -> Result<MaintenanceHistory, SourceError> {
        self.get_json(&format!("/maintenance/{id}"), Some(id)).await
    }

    async fn fuel(&self, id: VehicleId) -> Result<FuelHistory, SourceError> {
        self.get_json(&format!("/fuel/{id}"), Some(id)).await
    }
}

/// In-memory fleet snapshot, usually loaded from a JSON fixture file.
///
/// The file mirrors the backend responses keyed by vehicle id:
/// `{ "vehicles": [...], "maintenance": { "1": {...} }, "fuel": { "1": {...} } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureFleetSource {
    #[serde(default)]
    vehicles: Vec<Vehicle>,
    #[serde(default)]
    maintenance: BTreeMap<VehicleId, MaintenanceHistory>,
    #[serde(default)]
    fuel: BTreeMap<VehicleId, FuelHistory>,
}

impl FixtureFleetSource {
    pub fn new(
        vehicles: Vec<Vehicle>,
        maintenance: BTreeMap<VehicleId, MaintenanceHistory>,
        fuel: BTreeMap<VehicleId, FuelHistory>,
    ) -> Self {
        Self {
            vehicles,
            maintenance,
            fuel,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&contents)
    }

    pub fn from_slice(contents: &[u8]) -> Result<Self, SourceError> {
        Ok(serde_json::from_slice(contents)?)
    }

    fn ensure_known(&self, id: VehicleId) -> Result<(), SourceError> {
        if self.vehicles.iter().any(|vehicle| vehicle.id == id) {
            Ok(())
        } else {
            Err(SourceError::NotFound(id))
        }
    }
}

impl FleetSource for FixtureFleetSource {
    async fn vehicles(&self) -> Result<Vec<Vehicle>, SourceError> {
        Ok(self.vehicles.clone())
    }

    async fn vehicle(&self, id: VehicleId) -> Result<Vehicle, SourceError> {
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.id == id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }

    async fn maintenance(&self, id: VehicleId) -> Result<MaintenanceHistory, SourceError> {
        self.ensure_known(id)?;
        Ok(self.maintenance.get(&id).cloned().unwrap_or_default())
    }

    async fn fuel(&self, id: VehicleId) -> Result<FuelHistory, SourceError> {
        self.ensure_known(id)?;
        Ok(self.fuel.get(&id).cloned().unwrap_or_default())
    }
}

/// Source picked at startup from [`SourceConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredFleetSource {
    Http(HttpFleetSource),
    Fixture(FixtureFleetSource),
}

impl ConfiguredFleetSource {
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        match config {
            SourceConfig::Http {
                base_url,
                timeout_secs,
            } => HttpFleetSource::new(base_url.clone(), Duration::from_secs(*timeout_secs))
                .map(Self::Http),
            SourceConfig::Fixture { path } => FixtureFleetSource::from_path(path).map(Self::Fixture),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(source) => format!("http backend {}", source.base_url()),
            Self::Fixture(source) => format!("fixture ({} vehicles)", source.vehicles.len()),
        }
    }
}

impl FleetSource for ConfiguredFleetSource {
    async fn vehicles(&self) -> Result<Vec<Vehicle>, SourceError> {
        match self {
            Self::Http(source) => source.vehicles().await,
            Self::Fixture(source) => source.vehicles().await,
        }
    }

    async fn vehicle(&self, id: VehicleId) -> Result<Vehicle, SourceError> {
        match self {
            Self::Http(source) => source.vehicle(id).await,
            Self::Fixture(source) => source.vehicle(id).await,
        }
    }

    async fn maintenance(&self, id: VehicleId) -> Result<MaintenanceHistory, SourceError> {
        match self {
            Self::Http(source) => source.maintenance(id).await,
            Self::Fixture(source) => source.maintenance(id).await,
        }
    }

    async fn fuel(&self, id: VehicleId) -> Result<FuelHistory, SourceError> {
        match self {
            Self::Http(source) => source.fuel(id).await,
            Self::Fixture(source) => source.fuel(id).await,
        }
    }
}
