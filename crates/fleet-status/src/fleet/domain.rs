use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned to a vehicle by the fleet backend.
pub type VehicleId = i64;

/// Vehicle snapshot as returned by `GET /vehicles` and `GET /vehicle/{id}`.
///
/// Date-bearing fields are kept as the raw text the backend emits; the
/// evaluator decides how to read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub reg_number: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub vin: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub qualification: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub mileage: u64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub tachograph_required: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub osago_valid: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub tech_inspection_valid: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub skzi_valid_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub last_to_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub next_to_date: Option<String>,
    #[serde(default)]
    pub next_to: Option<i64>,
    #[serde(default)]
    pub remaining_km: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub fuel_tank_capacity: Option<f64>,
    #[serde(default)]
    pub avg_fuel_consumption: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
}

impl Vehicle {
    /// Short human-facing name, e.g. `KAMAZ 5490 (A123BC77)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.model, self.reg_number)
    }
}

/// Scheduled maintenance (TO) entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub date: String,
    pub mileage: u64,
    #[serde(default)]
    pub works: String,
}

/// Unplanned repair entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRecord {
    pub date: String,
    pub mileage: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: Option<f64>,
}

/// A single refuelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEntry {
    pub date: String,
    pub mileage: u64,
    pub liters: f64,
    pub cost_per_liter: f64,
}

impl FuelEntry {
    pub fn total(&self) -> f64 {
        self.liters * self.cost_per_liter
    }
}

/// Aggregate fuel figures for one vehicle.
///
/// Averages are `None` when there is no basis for them; callers render that
/// as "no data" rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelStats {
    #[serde(default)]
    pub total_fuel_liters: f64,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub avg_consumption: Option<f64>,
    #[serde(default, deserialize_with = "positive_or_none")]
    pub avg_cost_per_liter: Option<f64>,
    #[serde(default)]
    pub total_fuel_cost: f64,
    #[serde(default)]
    pub entry_count: usize,
}

impl FuelStats {
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0 && self.total_fuel_liters == 0.0
    }
}

/// Body of `GET /maintenance/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceHistory {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub maintenance: Vec<MaintenanceRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repairs: Vec<RepairRecord>,
}

/// Body of `GET /fuel/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelHistory {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub refueling: Vec<FuelEntry>,
    #[serde(default)]
    pub stats: Option<FuelStats>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn positive_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<f64>::deserialize(deserializer)?;
    Ok(opt.filter(|value| value.is_finite() && *value > 0.0))
}

// SQLite-backed endpoints serialise booleans as 0/1.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        Some(Flag::Text(value)) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vehicle_decodes_sqlite_row_shape() {
        let vehicle: Vehicle = serde_json::from_value(json!({
            "id": 3,
            "model": "KAMAZ 5490",
            "reg_number": "A123BC77",
            "vin": "",
            "mileage": 152300,
            "tachograph_required": 1,
            "osago_valid": "05.03.2026",
            "tech_inspection_valid": null,
            "next_to": 160000,
            "fuel_tank_capacity": 400.0
        }))
        .expect("vehicle decodes");

        assert_eq!(vehicle.id, 3);
        assert!(vehicle.vin.is_none());
        assert!(vehicle.tachograph_required);
        assert_eq!(vehicle.osago_valid.as_deref(), Some("05.03.2026"));
        assert!(vehicle.tech_inspection_valid.is_none());
        assert_eq!(vehicle.next_to, Some(160_000));
        assert_eq!(vehicle.display_name(), "KAMAZ 5490 (A123BC77)");
    }

    #[test]
    fn missing_collections_decode_as_empty() {
        let history: MaintenanceHistory =
            serde_json::from_value(json!({ "maintenance": null })).expect("decodes");
        assert!(history.maintenance.is_empty());
        assert!(history.repairs.is_empty());

        let fuel: FuelHistory = serde_json::from_value(json!({})).expect("decodes");
        assert!(fuel.refueling.is_empty());
        assert!(fuel.stats.is_none());
    }

    #[test]
    fn reported_zero_averages_are_treated_as_absent() {
        let stats: FuelStats = serde_json::from_value(json!({
            "avg_consumption": 0,
            "total_fuel_cost": 0,
            "total_fuel_liters": 0,
            "avg_cost_per_liter": 0
        }))
        .expect("decodes");
        assert!(stats.avg_consumption.is_none());
        assert!(stats.avg_cost_per_liter.is_none());
        assert!(stats.is_empty());
    }
}
