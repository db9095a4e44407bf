use fleet_status::fleet::{
    format_dotted, AlertTopic, CredentialStatus, FleetOverview, StatusAlert, VehicleStatusReport,
};
use std::io::{self, Write};

pub(crate) fn write_vehicle_status<W: Write>(
    out: &mut W,
    report: &VehicleStatusReport,
) -> io::Result<()> {
    let VehicleStatusReport {
        vehicle,
        maintenance,
        fuel,
        status,
    } = report;

    writeln!(out, "{}", vehicle.display_name())?;
    if let Some(vin) = &vehicle.vin {
        writeln!(out, "VIN: {}", vin)?;
    }
    if let Some(category) = &vehicle.category {
        writeln!(out, "Category: {}", category)?;
    }
    writeln!(out, "Mileage: {} km", vehicle.mileage)?;

    writeln!(out, "\nDocuments")?;
    for credential in &status.credentials {
        writeln!(out, "- {}", credential_line(credential))?;
    }

    writeln!(out, "\nMaintenance")?;
    match status.remaining_km {
        Some(km) => writeln!(
            out,
            "- {} km until next service ({}, {})",
            km,
            status.maintenance_due.label(),
            status.maintenance_urgency.label()
        )?,
        None => writeln!(out, "- Next service mileage not recorded")?,
    }
    if let Some(date) = status.last_service_date {
        writeln!(out, "- Last service: {}", format_dotted(date))?;
    }
    if let Some(date) = status.next_service_date {
        writeln!(out, "- Next service: {}", format_dotted(date))?;
    }
    if let Some(projection) = status.projected_service {
        writeln!(
            out,
            "- Projected from last record: service at {} km ({} km left)",
            projection.next_service_km, projection.remaining_km
        )?;
    }

    if maintenance.maintenance.is_empty() {
        writeln!(out, "\nService history: none")?;
    } else {
        writeln!(out, "\nService history")?;
        for record in &maintenance.maintenance {
            writeln!(out, "- {} at {} km: {}", record.date, record.mileage, record.works)?;
        }
    }

    if maintenance.repairs.is_empty() {
        writeln!(out, "\nRepairs: none")?;
    } else {
        writeln!(out, "\nRepairs")?;
        for repair in &maintenance.repairs {
            match repair.cost {
                Some(cost) => writeln!(
                    out,
                    "- {} at {} km: {} ({:.2})",
                    repair.date, repair.mileage, repair.description, cost
                )?,
                None => writeln!(
                    out,
                    "- {} at {} km: {}",
                    repair.date, repair.mileage, repair.description
                )?,
            }
        }
        if status.repairs.costed > 0 {
            writeln!(out, "Total repair cost: {:.2}", status.repairs.total_cost)?;
        }
    }

    if fuel.refueling.is_empty() {
        writeln!(out, "\nFuel: no fill-ups recorded")?;
    } else {
        let stats = &status.fuel;
        writeln!(out, "\nFuel")?;
        writeln!(
            out,
            "- {} fill-ups | {:.2} l | {:.2} total cost",
            stats.entry_count, stats.total_fuel_liters, stats.total_fuel_cost
        )?;
        match stats.avg_cost_per_liter {
            Some(price) => writeln!(out, "- Average price: {:.2} per l", price)?,
            None => writeln!(out, "- Average price: n/a")?,
        }
        match stats.avg_consumption {
            Some(consumption) => writeln!(out, "- Consumption: {:.2} l/100 km", consumption)?,
            None => writeln!(out, "- Consumption: n/a")?,
        }
    }

    if status.alerts.is_empty() {
        writeln!(out, "\nAlerts: none")?;
    } else {
        writeln!(out, "\nAlerts")?;
        for alert in &status.alerts {
            writeln!(out, "- {}", alert_line(alert))?;
        }
    }

    Ok(())
}

pub(crate) fn write_fleet_report<W: Write>(out: &mut W, overview: &FleetOverview) -> io::Result<()> {
    writeln!(
        out,
        "Fleet expiration report ({})",
        format_dotted(overview.generated_at.date())
    )?;

    for row in &overview.rows {
        writeln!(out, "\n{} ({})", row.model, row.reg_number)?;
        for credential in row.credentials() {
            if credential.required {
                writeln!(out, "- {}", report_credential_line(credential))?;
            }
        }
        match row.remaining_km {
            Some(km) => writeln!(
                out,
                "- TO: {} km left ({})",
                km,
                row.maintenance_urgency.label()
            )?,
            None => writeln!(out, "- TO: {}", row.maintenance_urgency.label())?,
        }
    }

    let counts = &overview.counts;
    writeln!(
        out,
        "\n{} vehicles | {} need attention | {} due for service | {} expiring ({} this week) | {} expired",
        counts.vehicles,
        counts.needing_attention,
        counts.maintenance_due,
        counts.expiring_soon,
        counts.critical,
        counts.expired
    )?;
    if counts.without_osago_date > 0 {
        writeln!(out, "{} vehicles have no OSAGO date on file", counts.without_osago_date)?;
    }
    Ok(())
}

fn credential_line(credential: &CredentialStatus) -> String {
    let label = credential.kind.label();
    if !credential.required {
        return format!("{}: not required", label);
    }
    match (credential.valid_until, credential.days_remaining, credential.status) {
        (Some(date), Some(days), Some(status)) => format!(
            "{}: {} ({}, {} days)",
            label,
            format_dotted(date),
            status.label(),
            days
        ),
        _ => format!("{}: no date", label),
    }
}

// The report ranks credentials by urgency tier rather than validity.
fn report_credential_line(credential: &CredentialStatus) -> String {
    let label = credential.kind.label();
    match (credential.valid_until, credential.days_remaining, credential.urgency) {
        (Some(date), Some(days), Some(urgency)) => format!(
            "{}: {} ({}, {} days)",
            label,
            format_dotted(date),
            urgency.label(),
            days
        ),
        _ => format!("{}: no date", label),
    }
}

fn alert_line(alert: &StatusAlert) -> String {
    let detail = match alert.topic {
        AlertTopic::MaintenanceDue { remaining_km } => {
            format!("service due in {} km", remaining_km)
        }
        AlertTopic::CredentialExpiring {
            credential,
            days_remaining,
        } => format!("{} expires in {} days", credential.label(), days_remaining),
        AlertTopic::CredentialExpired { credential, .. } => {
            format!("{} has expired", credential.label())
        }
    };
    format!("[{}] {}", alert.severity.label(), detail)
}
