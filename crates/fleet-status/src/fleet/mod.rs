//! Vehicle status derivation for the fleet dashboard.
//!
//! The evaluator modules (`dates`, `status`, `fuel`, `evaluator`) are pure and
//! synchronous. `source`, `service` and `router` wrap them with retrieval from
//! the fleet backend and an HTTP surface.

pub mod dates;
pub mod domain;
pub mod evaluator;
pub mod fuel;
pub mod overview;
pub mod router;
pub mod service;
pub mod source;
pub mod status;

pub use dates::{days_until, format_dotted, parse_flexible_date};
pub use domain::{
    FuelEntry, FuelHistory, FuelStats, MaintenanceHistory, MaintenanceRecord, RepairRecord,
    Vehicle, VehicleId,
};
pub use evaluator::{
    AlertSeverity, AlertTopic, MaintenanceState, ProjectedService, RepairSummary, StatusAlert,
    VehicleAssessment, VehicleStatus, VehicleStatusEvaluator, DEFAULT_SERVICE_INTERVAL_KM,
};
pub use fuel::compute_fuel_aggregate;
pub use overview::{FleetCounts, FleetOverview, FleetRow};
pub use router::fleet_router;
pub use service::{VehicleStatusReport, VehicleStatusService};
pub use source::{
    ConfiguredFleetSource, FixtureFleetSource, FleetSource, HttpFleetSource, SourceError,
};
pub use status::{
    classify_credential_urgency, classify_expiry, classify_maintenance_due,
    classify_maintenance_urgency, CredentialKind, CredentialStatus, CredentialUrgency,
    ExpiryStatus, MaintenanceDue, MaintenanceUrgency,
};
