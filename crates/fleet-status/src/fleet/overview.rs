use super::domain::{Vehicle, VehicleId};
use super::evaluator::{VehicleAssessment, VehicleStatusEvaluator};
use super::status::{
    CredentialKind, CredentialStatus, CredentialUrgency, ExpiryStatus, MaintenanceDue,
    MaintenanceUrgency,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;

/// One line of the fleet-wide expiration report.
#[derive(Debug, Clone, Serialize)]
pub struct FleetRow {
    pub vehicle_id: VehicleId,
    pub model: String,
    pub reg_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub mileage: u64,
    pub osago: CredentialStatus,
    pub tech_inspection: CredentialStatus,
    pub skzi: CredentialStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_km: Option<i64>,
    pub maintenance_due: MaintenanceDue,
    pub maintenance_urgency: MaintenanceUrgency,
}

impl FleetRow {
    pub fn credentials(&self) -> [&CredentialStatus; 3] {
        [&self.osago, &self.tech_inspection, &self.skzi]
    }

    pub fn needs_attention(&self) -> bool {
        self.maintenance_due == MaintenanceDue::DueSoon
            || self.credentials().iter().any(|c| c.needs_attention())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetCounts {
    pub vehicles: usize,
    pub needing_attention: usize,
    pub maintenance_due: usize,
    pub expiring_soon: usize,
    /// Required credentials lapsing within a week, a subset of `expiring_soon`
    /// plus any lapsing today.
    pub critical: usize,
    pub expired: usize,
    pub without_osago_date: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetOverview {
    pub generated_at: NaiveDateTime,
    pub rows: Vec<FleetRow>,
    pub counts: FleetCounts,
}

impl FleetOverview {
    /// Rows keep the order the backend listed the vehicles in.
    pub fn build(
        vehicles: &[Vehicle],
        evaluator: &VehicleStatusEvaluator,
        now: NaiveDateTime,
    ) -> Self {
        let rows: Vec<FleetRow> = vehicles
            .iter()
            .map(|vehicle| row_for(vehicle, evaluator, now))
            .collect();

        let mut counts = FleetCounts {
            vehicles: rows.len(),
            ..FleetCounts::default()
        };
        for row in &rows {
            if row.needs_attention() {
                counts.needing_attention += 1;
            }
            if row.maintenance_due == MaintenanceDue::DueSoon {
                counts.maintenance_due += 1;
            }
            if row.osago.valid_until.is_none() {
                counts.without_osago_date += 1;
            }
            for credential in row.credentials().into_iter().filter(|c| c.required) {
                match credential.status {
                    Some(ExpiryStatus::ExpiringSoon) => counts.expiring_soon += 1,
                    Some(ExpiryStatus::Expired) => counts.expired += 1,
                    Some(ExpiryStatus::Ok) | None => {}
                }
                if credential.urgency == Some(CredentialUrgency::Critical) {
                    counts.critical += 1;
                }
            }
        }

        Self {
            generated_at: now,
            rows,
            counts,
        }
    }

    /// Write the report as CSV, one vehicle per record.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "vehicle_id",
            "model",
            "reg_number",
            "mileage",
            "osago_valid_until",
            "osago_days",
            "osago_status",
            "osago_urgency",
            "tech_inspection_valid_until",
            "tech_inspection_days",
            "tech_inspection_status",
            "tech_inspection_urgency",
            "skzi_required",
            "skzi_valid_until",
            "skzi_days",
            "skzi_status",
            "skzi_urgency",
            "remaining_km",
            "maintenance_urgency",
        ])?;

        for row in &self.rows {
            let mut record = vec![
                row.vehicle_id.to_string(),
                row.model.clone(),
                row.reg_number.clone(),
                row.mileage.to_string(),
            ];
            for credential in [&row.osago, &row.tech_inspection] {
                record.extend(credential_cells(credential));
            }
            record.push(row.skzi.required.to_string());
            record.extend(credential_cells(&row.skzi));
            record.push(
                row.remaining_km
                    .map(|km| km.to_string())
                    .unwrap_or_default(),
            );
            record.push(urgency_key(row.maintenance_urgency).to_string());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn row_for(vehicle: &Vehicle, evaluator: &VehicleStatusEvaluator, now: NaiveDateTime) -> FleetRow {
    let VehicleAssessment {
        credentials,
        maintenance,
    } = evaluator.assess(vehicle, now);
    let mut credentials = credentials.into_iter();
    let mut take = |kind: CredentialKind| {
        credentials
            .find(|c| c.kind == kind)
            .unwrap_or(CredentialStatus {
                kind,
                required: false,
                valid_until: None,
                days_remaining: None,
                status: None,
                urgency: None,
            })
    };
    let osago = take(CredentialKind::Osago);
    let tech_inspection = take(CredentialKind::TechInspection);
    let skzi = take(CredentialKind::Skzi);

    FleetRow {
        vehicle_id: vehicle.id,
        model: vehicle.model.clone(),
        reg_number: vehicle.reg_number.clone(),
        category: vehicle.category.clone(),
        mileage: vehicle.mileage,
        osago,
        tech_inspection,
        skzi,
        remaining_km: maintenance.remaining_km,
        maintenance_due: maintenance.due,
        maintenance_urgency: maintenance.urgency,
    }
}

fn credential_cells(credential: &CredentialStatus) -> [String; 4] {
    [
        credential
            .valid_until
            .map(|date| date.to_string())
            .unwrap_or_default(),
        credential
            .days_remaining
            .map(|days| days.to_string())
            .unwrap_or_default(),
        credential
            .status
            .map(|status| expiry_key(status).to_string())
            .unwrap_or_default(),
        credential
            .urgency
            .map(|urgency| credential_urgency_key(urgency).to_string())
            .unwrap_or_default(),
    ]
}

fn expiry_key(status: ExpiryStatus) -> &'static str {
    match status {
        ExpiryStatus::Ok => "ok",
        ExpiryStatus::ExpiringSoon => "expiring_soon",
        ExpiryStatus::Expired => "expired",
    }
}

fn credential_urgency_key(urgency: CredentialUrgency) -> &'static str {
    match urgency {
        CredentialUrgency::Normal => "normal",
        CredentialUrgency::Soon => "soon",
        CredentialUrgency::Critical => "critical",
        CredentialUrgency::Overdue => "overdue",
    }
}

fn urgency_key(urgency: MaintenanceUrgency) -> &'static str {
    match urgency {
        MaintenanceUrgency::NotScheduled => "not_scheduled",
        MaintenanceUrgency::Normal => "normal",
        MaintenanceUrgency::Approaching => "approaching",
        MaintenanceUrgency::Critical => "critical",
        MaintenanceUrgency::Overdue => "overdue",
    }
}
