use super::dates::parse_optional_date;
use super::domain::{
    FuelHistory, FuelStats, MaintenanceHistory, MaintenanceRecord, RepairRecord, Vehicle,
    VehicleId,
};
use super::fuel::{compute_fuel_aggregate, merge_reported};
use super::status::{
    classify_maintenance_due, classify_maintenance_urgency, CredentialKind, CredentialStatus,
    ExpiryStatus, MaintenanceDue, MaintenanceUrgency,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE_INTERVAL_KM: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AlertTopic {
    MaintenanceDue { remaining_km: i64 },
    CredentialExpiring { credential: CredentialKind, days_remaining: i64 },
    CredentialExpired { credential: CredentialKind, days_remaining: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAlert {
    pub severity: AlertSeverity,
    #[serde(flatten)]
    pub topic: AlertTopic,
}

/// Next service target extrapolated from the last recorded maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedService {
    pub last_service_km: u64,
    pub next_service_km: u64,
    pub remaining_km: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub count: usize,
    pub costed: usize,
    pub total_cost: f64,
}

/// Display-ready status bundle for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vehicle_id: VehicleId,
    pub credentials: Vec<CredentialStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_km: Option<i64>,
    pub maintenance_due: MaintenanceDue,
    pub maintenance_urgency: MaintenanceUrgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_service_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_service_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_service: Option<ProjectedService>,
    pub maintenance_count: usize,
    pub repairs: RepairSummary,
    pub fuel: FuelStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<StatusAlert>,
}

impl VehicleStatus {
    pub fn credential(&self, kind: CredentialKind) -> Option<&CredentialStatus> {
        self.credentials.iter().find(|status| status.kind == kind)
    }

    pub fn highest_severity(&self) -> Option<AlertSeverity> {
        self.alerts.iter().map(|alert| alert.severity).max()
    }
}

/// `next_to - mileage` when a target is known; a backend-supplied value is
/// passed through only when there is no target to recompute from.
/// Kilometres left until `next_to`; odometer values outside the signed range
/// leave the budget unknown.
pub fn remaining_km(vehicle: &Vehicle) -> Option<i64> {
    match vehicle.next_to {
        Some(target) => i64::try_from(vehicle.mileage)
            .ok()
            .and_then(|mileage| target.checked_sub(mileage)),
        None => vehicle.remaining_km,
    }
}

pub fn project_next_service(
    last_service_km: u64,
    current_mileage: u64,
    interval_km: u64,
) -> Option<ProjectedService> {
    let next_service_km = last_service_km.checked_add(interval_km)?;
    let remaining_km = i64::try_from(next_service_km)
        .ok()?
        .checked_sub(i64::try_from(current_mileage).ok()?)?;
    Some(ProjectedService {
        last_service_km,
        next_service_km,
        remaining_km,
    })
}

/// Mileage-based service state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceState {
    pub remaining_km: Option<i64>,
    pub due: MaintenanceDue,
    pub urgency: MaintenanceUrgency,
}

impl MaintenanceState {
    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        let remaining_km = remaining_km(vehicle);
        Self {
            remaining_km,
            due: classify_maintenance_due(remaining_km),
            urgency: classify_maintenance_urgency(remaining_km),
        }
    }
}

/// Credential and maintenance state, the part of [`VehicleStatus`] that needs
/// only the vehicle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleAssessment {
    pub credentials: Vec<CredentialStatus>,
    pub maintenance: MaintenanceState,
}

/// Pure evaluator turning raw vehicle records into a [`VehicleStatus`].
#[derive(Debug, Clone, Copy)]
pub struct VehicleStatusEvaluator {
    service_interval_km: u64,
}

impl Default for VehicleStatusEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_INTERVAL_KM)
    }
}

impl VehicleStatusEvaluator {
    pub fn new(service_interval_km: u64) -> Self {
        let service_interval_km = if service_interval_km == 0 {
            DEFAULT_SERVICE_INTERVAL_KM
        } else {
            service_interval_km
        };
        Self {
            service_interval_km,
        }
    }

    pub fn service_interval_km(&self) -> u64 {
        self.service_interval_km
    }

    pub fn credentials(&self, vehicle: &Vehicle, now: NaiveDateTime) -> Vec<CredentialStatus> {
        CredentialKind::ordered()
            .into_iter()
            .map(|kind| {
                let (required, raw) = match kind {
                    CredentialKind::Osago => (true, vehicle.osago_valid.as_deref()),
                    CredentialKind::TechInspection => {
                        (true, vehicle.tech_inspection_valid.as_deref())
                    }
                    CredentialKind::Skzi => (
                        vehicle.tachograph_required,
                        vehicle.skzi_valid_date.as_deref(),
                    ),
                };
                CredentialStatus::assess(kind, required, raw, now)
            })
            .collect()
    }

    pub fn assess(&self, vehicle: &Vehicle, now: NaiveDateTime) -> VehicleAssessment {
        VehicleAssessment {
            credentials: self.credentials(vehicle, now),
            maintenance: MaintenanceState::for_vehicle(vehicle),
        }
    }

    pub fn evaluate(
        &self,
        vehicle: &Vehicle,
        maintenance: Option<&MaintenanceHistory>,
        fuel: Option<&FuelHistory>,
        now: NaiveDateTime,
    ) -> VehicleStatus {
        let VehicleAssessment {
            credentials,
            maintenance: state,
        } = self.assess(vehicle, now);

        let records: &[MaintenanceRecord] = maintenance
            .map(|history| history.maintenance.as_slice())
            .unwrap_or(&[]);
        let repairs: &[RepairRecord] = maintenance
            .map(|history| history.repairs.as_slice())
            .unwrap_or(&[]);

        let projected_service = records
            .iter()
            .map(|record| record.mileage)
            .max()
            .and_then(|last| project_next_service(last, vehicle.mileage, self.service_interval_km));

        let repair_summary = RepairSummary {
            count: repairs.len(),
            costed: repairs.iter().filter(|r| r.cost.is_some()).count(),
            total_cost: repairs.iter().filter_map(|r| r.cost).sum(),
        };

        let fuel_stats = match fuel {
            Some(history) => merge_reported(
                compute_fuel_aggregate(&history.refueling),
                history.stats.as_ref(),
            ),
            None => FuelStats::default(),
        };

        let alerts = collect_alerts(&credentials, state.remaining_km, state.due);

        VehicleStatus {
            vehicle_id: vehicle.id,
            credentials,
            remaining_km: state.remaining_km,
            maintenance_due: state.due,
            maintenance_urgency: state.urgency,
            last_service_date: parse_optional_date(vehicle.last_to_date.as_deref()),
            next_service_date: parse_optional_date(vehicle.next_to_date.as_deref()),
            projected_service,
            maintenance_count: records.len(),
            repairs: repair_summary,
            fuel: fuel_stats,
            alerts,
        }
    }
}

fn collect_alerts(
    credentials: &[CredentialStatus],
    remaining_km: Option<i64>,
    due: MaintenanceDue,
) -> Vec<StatusAlert> {
    let mut alerts = Vec::new();

    if let (MaintenanceDue::DueSoon, Some(km)) = (due, remaining_km) {
        alerts.push(StatusAlert {
            severity: if km <= 0 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
            topic: AlertTopic::MaintenanceDue { remaining_km: km },
        });
    }

    for credential in credentials.iter().filter(|c| c.required) {
        let (Some(status), Some(days)) = (credential.status, credential.days_remaining) else {
            continue;
        };
        match status {
            ExpiryStatus::Ok => {}
            ExpiryStatus::ExpiringSoon => alerts.push(StatusAlert {
                severity: AlertSeverity::Warning,
                topic: AlertTopic::CredentialExpiring {
                    credential: credential.kind,
                    days_remaining: days,
                },
            }),
            ExpiryStatus::Expired => alerts.push(StatusAlert {
                severity: AlertSeverity::Critical,
                topic: AlertTopic::CredentialExpired {
                    credential: credential.kind,
                    days_remaining: days,
                },
            }),
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::domain::FuelEntry;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid now")
    }

    fn vehicle() -> Vehicle {
        Vehicle {
            id: 7,
            model: "GAZelle Next".to_string(),
            reg_number: "K777KK99".to_string(),
            mileage: 59_400,
            next_to: Some(60_000),
            osago_valid: Some("20.03.2024".to_string()),
            tech_inspection_valid: Some("2025-01-10".to_string()),
            skzi_valid_date: Some("01.01.2024".to_string()),
            tachograph_required: false,
            ..Vehicle::default()
        }
    }

    #[test]
    fn remaining_km_recomputes_from_target() {
        let mut v = vehicle();
        v.remaining_km = Some(12_345);
        assert_eq!(remaining_km(&v), Some(600));

        v.next_to = None;
        assert_eq!(remaining_km(&v), Some(12_345));

        v.remaining_km = None;
        assert_eq!(remaining_km(&v), None);

        let overdue = Vehicle {
            mileage: 61_000,
            next_to: Some(60_000),
            ..Vehicle::default()
        };
        assert_eq!(remaining_km(&overdue), Some(-1000));
    }

    #[test]
    fn odometer_extremes_leave_budget_unknown() {
        let below_range = Vehicle {
            id: 1,
            mileage: 1,
            next_to: Some(i64::MIN),
            ..Vehicle::default()
        };
        assert_eq!(remaining_km(&below_range), None);

        let huge_odometer = Vehicle {
            id: 2,
            mileage: u64::MAX,
            next_to: Some(100),
            ..Vehicle::default()
        };
        assert_eq!(remaining_km(&huge_odometer), None);
        let status = VehicleStatusEvaluator::default().evaluate(&huge_odometer, None, None, now());
        assert_eq!(status.maintenance_due, MaintenanceDue::Ok);
        assert_eq!(status.maintenance_urgency, MaintenanceUrgency::NotScheduled);
        assert!(status.alerts.is_empty());

        assert_eq!(project_next_service(u64::MAX, 10, 10_000), None);
        assert_eq!(project_next_service(40_000, u64::MAX, 10_000), None);
        assert_eq!(
            project_next_service(40_000, 45_000, 10_000).map(|p| p.remaining_km),
            Some(5_000)
        );
    }

    #[test]
    fn assessment_matches_full_evaluation() {
        let evaluator = VehicleStatusEvaluator::default();
        let assessment = evaluator.assess(&vehicle(), now());
        let status = evaluator.evaluate(&vehicle(), None, None, now());

        assert_eq!(assessment.credentials, status.credentials);
        assert_eq!(assessment.maintenance.remaining_km, status.remaining_km);
        assert_eq!(assessment.maintenance.due, status.maintenance_due);
        assert_eq!(assessment.maintenance.urgency, status.maintenance_urgency);
    }

    #[test]
    fn evaluate_raises_maintenance_and_osago_alerts() {
        let status = VehicleStatusEvaluator::default().evaluate(&vehicle(), None, None, now());

        assert_eq!(status.maintenance_due, MaintenanceDue::DueSoon);
        assert_eq!(status.maintenance_urgency, MaintenanceUrgency::Approaching);
        assert_eq!(
            status.credential(CredentialKind::Osago).and_then(|c| c.status),
            Some(ExpiryStatus::ExpiringSoon)
        );
        assert_eq!(
            status
                .credential(CredentialKind::TechInspection)
                .and_then(|c| c.status),
            Some(ExpiryStatus::Ok)
        );
        assert!(status.alerts.iter().any(|alert| matches!(
            alert.topic,
            AlertTopic::MaintenanceDue { remaining_km: 600 }
        )));
        assert!(status.alerts.iter().any(|alert| matches!(
            alert.topic,
            AlertTopic::CredentialExpiring {
                credential: CredentialKind::Osago,
                days_remaining: 19
            }
        )));
        // SKZI expired but no tachograph is fitted.
        assert!(!status.alerts.iter().any(|alert| matches!(
            alert.topic,
            AlertTopic::CredentialExpired {
                credential: CredentialKind::Skzi,
                ..
            }
        )));
        assert_eq!(status.highest_severity(), Some(AlertSeverity::Warning));
        assert!(status.fuel.is_empty());
    }

    #[test]
    fn tachograph_vehicles_get_skzi_alerts() {
        let mut v = vehicle();
        v.tachograph_required = true;
        let status = VehicleStatusEvaluator::default().evaluate(&v, None, None, now());
        assert!(status.alerts.iter().any(|alert| alert.severity == AlertSeverity::Critical
            && matches!(
                alert.topic,
                AlertTopic::CredentialExpired {
                    credential: CredentialKind::Skzi,
                    ..
                }
            )));
    }

    #[test]
    fn missing_data_is_not_an_alert() {
        let bare = Vehicle {
            id: 1,
            model: "Unknown".to_string(),
            osago_valid: Some("garbage".to_string()),
            ..Vehicle::default()
        };
        let status = VehicleStatusEvaluator::default().evaluate(&bare, None, None, now());
        assert_eq!(status.maintenance_due, MaintenanceDue::Ok);
        assert_eq!(status.maintenance_urgency, MaintenanceUrgency::NotScheduled);
        assert!(status.alerts.is_empty());
        assert!(status.projected_service.is_none());
    }

    #[test]
    fn related_records_feed_summaries() {
        let maintenance = MaintenanceHistory {
            maintenance: vec![
                MaintenanceRecord {
                    date: "10.01.2024".to_string(),
                    mileage: 50_000,
                    works: "Oil change".to_string(),
                },
                MaintenanceRecord {
                    date: "10.06.2023".to_string(),
                    mileage: 40_000,
                    works: "Filters".to_string(),
                },
            ],
            repairs: vec![
                RepairRecord {
                    date: "12.02.2024".to_string(),
                    mileage: 55_000,
                    description: "Brake pads".to_string(),
                    cost: Some(8_500.0),
                },
                RepairRecord {
                    date: "20.02.2024".to_string(),
                    mileage: 57_000,
                    description: "Headlight".to_string(),
                    cost: None,
                },
            ],
        };
        let fuel = FuelHistory {
            refueling: vec![
                FuelEntry {
                    date: "01.02.2024".to_string(),
                    mileage: 58_000,
                    liters: 50.0,
                    cost_per_liter: 55.0,
                },
                FuelEntry {
                    date: "15.02.2024".to_string(),
                    mileage: 59_000,
                    liters: 120.0,
                    cost_per_liter: 57.0,
                },
            ],
            stats: None,
        };

        let status = VehicleStatusEvaluator::new(10_000).evaluate(
            &vehicle(),
            Some(&maintenance),
            Some(&fuel),
            now(),
        );

        assert_eq!(status.maintenance_count, 2);
        assert_eq!(
            status.projected_service,
            Some(ProjectedService {
                last_service_km: 50_000,
                next_service_km: 60_000,
                remaining_km: 600,
            })
        );
        assert_eq!(status.repairs.count, 2);
        assert_eq!(status.repairs.costed, 1);
        assert_eq!(status.repairs.total_cost, 8_500.0);
        assert_eq!(status.fuel.total_fuel_liters, 170.0);
        assert_eq!(status.fuel.avg_cost_per_liter, Some(56.0));
        assert_eq!(status.fuel.avg_consumption, Some(12.0));
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        assert_eq!(
            VehicleStatusEvaluator::new(0).service_interval_km(),
            DEFAULT_SERVICE_INTERVAL_KM
        );
    }
}
