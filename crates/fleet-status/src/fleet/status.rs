use super::dates::{days_until, parse_optional_date};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Days before expiry at which a credential starts warning.
pub const EXPIRY_WARNING_DAYS: i64 = 30;
/// Days before expiry at which the fleet report treats a credential as critical.
pub const EXPIRY_CRITICAL_DAYS: i64 = 7;
/// Remaining kilometres below which maintenance is flagged as due.
pub const MAINTENANCE_WARNING_KM: i64 = 1000;
const MAINTENANCE_CRITICAL_KM: i64 = 500;

/// Validity state of an expiry-dated credential.
///
/// Variants are declared from least to most urgent so `Ord` follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Ok,
    ExpiringSoon,
    Expired,
}

impl ExpiryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "Valid",
            Self::ExpiringSoon => "Expiring soon",
            Self::Expired => "Expired",
        }
    }
}

pub fn classify_expiry(days_remaining: i64) -> ExpiryStatus {
    if days_remaining <= 0 {
        ExpiryStatus::Expired
    } else if days_remaining <= EXPIRY_WARNING_DAYS {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Ok
    }
}

/// Report tiers for a credential's remaining days.
///
/// Unlike [`ExpiryStatus`], a credential lapsing today is still `Critical`;
/// only a negative count is `Overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialUrgency {
    Normal,
    Soon,
    Critical,
    Overdue,
}

impl CredentialUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "OK",
            Self::Soon => "Soon",
            Self::Critical => "Critical",
            Self::Overdue => "Overdue",
        }
    }
}

pub fn classify_credential_urgency(days_remaining: i64) -> CredentialUrgency {
    if days_remaining < 0 {
        CredentialUrgency::Overdue
    } else if days_remaining <= EXPIRY_CRITICAL_DAYS {
        CredentialUrgency::Critical
    } else if days_remaining <= EXPIRY_WARNING_DAYS {
        CredentialUrgency::Soon
    } else {
        CredentialUrgency::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceDue {
    Ok,
    DueSoon,
}

impl MaintenanceDue {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::DueSoon => "Due soon",
        }
    }
}

/// An absent mileage budget means there is not enough data to warn about.
pub fn classify_maintenance_due(remaining_km: Option<i64>) -> MaintenanceDue {
    match remaining_km {
        Some(km) if km < MAINTENANCE_WARNING_KM => MaintenanceDue::DueSoon,
        _ => MaintenanceDue::Ok,
    }
}

/// Finer-grained maintenance tiers used by the fleet expiration report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceUrgency {
    NotScheduled,
    Normal,
    Approaching,
    Critical,
    Overdue,
}

impl MaintenanceUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotScheduled => "Not scheduled",
            Self::Normal => "Normal",
            Self::Approaching => "Approaching",
            Self::Critical => "Critical",
            Self::Overdue => "Overdue",
        }
    }
}

pub fn classify_maintenance_urgency(remaining_km: Option<i64>) -> MaintenanceUrgency {
    match remaining_km {
        None => MaintenanceUrgency::NotScheduled,
        Some(km) if km <= 0 => MaintenanceUrgency::Overdue,
        Some(km) if km <= MAINTENANCE_CRITICAL_KM => MaintenanceUrgency::Critical,
        Some(km) if km <= MAINTENANCE_WARNING_KM => MaintenanceUrgency::Approaching,
        Some(_) => MaintenanceUrgency::Normal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Osago,
    TechInspection,
    Skzi,
}

impl CredentialKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Osago, Self::TechInspection, Self::Skzi]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Osago => "OSAGO",
            Self::TechInspection => "Technical inspection",
            Self::Skzi => "SKZI",
        }
    }
}

/// Evaluated state of one credential on a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub kind: CredentialKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpiryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<CredentialUrgency>,
}

impl CredentialStatus {
    /// Unparseable or missing dates leave every derived field empty.
    pub fn assess(
        kind: CredentialKind,
        required: bool,
        raw: Option<&str>,
        now: NaiveDateTime,
    ) -> Self {
        let valid_until = parse_optional_date(raw);
        let days_remaining = valid_until.map(|date| days_until(date, now));
        let status = days_remaining.map(classify_expiry);
        let urgency = days_remaining.map(classify_credential_urgency);

        Self {
            kind,
            required,
            valid_until,
            days_remaining,
            status,
            urgency,
        }
    }

    pub fn needs_attention(&self) -> bool {
        self.required && matches!(self.status, Some(s) if s != ExpiryStatus::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundaries() {
        assert_eq!(classify_expiry(0), ExpiryStatus::Expired);
        assert_eq!(classify_expiry(-5), ExpiryStatus::Expired);
        assert_eq!(classify_expiry(1), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify_expiry(30), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify_expiry(31), ExpiryStatus::Ok);
    }

    #[test]
    fn expiry_urgency_never_decreases_as_days_shrink() {
        let mut previous = classify_expiry(400);
        for days in (-60..400).rev() {
            let current = classify_expiry(days);
            assert!(
                current >= previous,
                "{days} days classified as {current:?} after {previous:?}"
            );
            previous = current;
        }
    }

    #[test]
    fn credential_urgency_singles_out_the_last_week() {
        assert_eq!(classify_credential_urgency(8), CredentialUrgency::Soon);
        assert_eq!(classify_credential_urgency(7), CredentialUrgency::Critical);
        assert_eq!(classify_credential_urgency(0), CredentialUrgency::Critical);
        assert_eq!(classify_credential_urgency(-1), CredentialUrgency::Overdue);
        assert_eq!(classify_credential_urgency(30), CredentialUrgency::Soon);
        assert_eq!(classify_credential_urgency(31), CredentialUrgency::Normal);

        let mut previous = classify_credential_urgency(400);
        for days in (-60..400).rev() {
            let current = classify_credential_urgency(days);
            assert!(current >= previous, "{days} days classified as {current:?}");
            previous = current;
        }
    }

    #[test]
    fn maintenance_due_boundaries() {
        assert_eq!(classify_maintenance_due(Some(999)), MaintenanceDue::DueSoon);
        assert_eq!(classify_maintenance_due(Some(1000)), MaintenanceDue::Ok);
        assert_eq!(classify_maintenance_due(Some(-20)), MaintenanceDue::DueSoon);
        assert_eq!(classify_maintenance_due(None), MaintenanceDue::Ok);
    }

    #[test]
    fn maintenance_urgency_tiers() {
        assert_eq!(
            classify_maintenance_urgency(None),
            MaintenanceUrgency::NotScheduled
        );
        assert_eq!(
            classify_maintenance_urgency(Some(0)),
            MaintenanceUrgency::Overdue
        );
        assert_eq!(
            classify_maintenance_urgency(Some(500)),
            MaintenanceUrgency::Critical
        );
        assert_eq!(
            classify_maintenance_urgency(Some(1000)),
            MaintenanceUrgency::Approaching
        );
        assert_eq!(
            classify_maintenance_urgency(Some(1001)),
            MaintenanceUrgency::Normal
        );
    }

    #[test]
    fn credential_assessment_tolerates_bad_dates() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid now");

        let expiring =
            CredentialStatus::assess(CredentialKind::Osago, true, Some("15.03.2024"), now);
        assert_eq!(expiring.days_remaining, Some(14));
        assert_eq!(expiring.status, Some(ExpiryStatus::ExpiringSoon));
        assert_eq!(expiring.urgency, Some(CredentialUrgency::Soon));
        assert!(expiring.needs_attention());

        let this_week =
            CredentialStatus::assess(CredentialKind::Osago, true, Some("08.03.2024"), now);
        assert_eq!(this_week.days_remaining, Some(7));
        assert_eq!(this_week.urgency, Some(CredentialUrgency::Critical));

        let garbage = CredentialStatus::assess(CredentialKind::Osago, true, Some("1.2"), now);
        assert!(garbage.valid_until.is_none());
        assert!(garbage.status.is_none());
        assert!(garbage.urgency.is_none());
        assert!(!garbage.needs_attention());

        let optional =
            CredentialStatus::assess(CredentialKind::Skzi, false, Some("01.01.2020"), now);
        assert_eq!(optional.status, Some(ExpiryStatus::Expired));
        assert!(!optional.needs_attention());
    }
}
