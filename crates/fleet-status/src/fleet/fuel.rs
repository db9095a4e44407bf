use super::domain::{FuelEntry, FuelStats};

/// Aggregate a vehicle's refuelling log.
///
/// The average price is a plain mean over entries, not weighted by volume.
/// Consumption needs at least two odometer readings that are some distance
/// apart; otherwise it stays `None`.
pub fn compute_fuel_aggregate(entries: &[FuelEntry]) -> FuelStats {
    if entries.is_empty() {
        return FuelStats::default();
    }

    let total_fuel_liters: f64 = entries.iter().map(|entry| entry.liters).sum();
    let total_fuel_cost: f64 = entries.iter().map(FuelEntry::total).sum();
    let price_sum: f64 = entries.iter().map(|entry| entry.cost_per_liter).sum();
    let avg_cost_per_liter = price_sum / entries.len() as f64;

    FuelStats {
        total_fuel_liters: round2(total_fuel_liters),
        avg_consumption: consumption_from_odometer(entries),
        avg_cost_per_liter: Some(round2(avg_cost_per_liter)).filter(|value| value.is_finite()),
        total_fuel_cost: round2(total_fuel_cost),
        entry_count: entries.len(),
    }
}

/// Litres per 100 km between the lowest and highest odometer reading.
///
/// The first fill-up (by mileage) only establishes the starting tank, so its
/// volume is excluded from the burn.
pub fn consumption_from_odometer(entries: &[FuelEntry]) -> Option<f64> {
    if entries.len() < 2 {
        return None;
    }

    let mut ordered: Vec<&FuelEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.mileage);

    let first = ordered.first()?;
    let last = ordered.last()?;
    let distance = last.mileage.checked_sub(first.mileage)?;
    if distance == 0 {
        return None;
    }

    let burned: f64 = ordered.iter().skip(1).map(|entry| entry.liters).sum();
    let rate = burned / distance as f64 * 100.0;
    rate.is_finite().then(|| round2(rate))
}

/// Prefer our own odometer-based figure; fall back to whatever the backend
/// reported when the log is too short to compute one.
pub fn merge_reported(mut computed: FuelStats, reported: Option<&FuelStats>) -> FuelStats {
    if computed.avg_consumption.is_none() {
        computed.avg_consumption = reported.and_then(|stats| stats.avg_consumption);
    }
    computed
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mileage: u64, liters: f64, cost_per_liter: f64) -> FuelEntry {
        FuelEntry {
            date: "01.03.2024".to_string(),
            mileage,
            liters,
            cost_per_liter,
        }
    }

    #[test]
    fn empty_log_yields_no_data() {
        let stats = compute_fuel_aggregate(&[]);
        assert_eq!(stats.total_fuel_liters, 0.0);
        assert_eq!(stats.total_fuel_cost, 0.0);
        assert!(stats.avg_cost_per_liter.is_none());
        assert!(stats.avg_consumption.is_none());
        assert!(stats.is_empty());
    }

    #[test]
    fn totals_and_unweighted_average_price() {
        let stats = compute_fuel_aggregate(&[entry(1000, 10.0, 50.0), entry(1000, 20.0, 60.0)]);
        assert_eq!(stats.total_fuel_liters, 30.0);
        assert_eq!(stats.avg_cost_per_liter, Some(55.0));
        assert_eq!(stats.total_fuel_cost, 1700.0);
        assert_eq!(stats.entry_count, 2);
        assert!(
            stats.avg_consumption.is_none(),
            "no distance between readings"
        );
    }

    #[test]
    fn consumption_uses_odometer_span() {
        let entries = [
            entry(10_500, 30.0, 52.0),
            entry(10_000, 60.0, 50.0),
            entry(11_000, 35.0, 51.0),
        ];
        // 65 litres burned over 1000 km, first fill-up (10 000 km) excluded.
        assert_eq!(consumption_from_odometer(&entries), Some(6.5));
    }

    #[test]
    fn single_reading_has_no_consumption() {
        assert!(consumption_from_odometer(&[entry(5000, 40.0, 50.0)]).is_none());
    }

    #[test]
    fn reported_consumption_fills_the_gap() {
        let computed = compute_fuel_aggregate(&[entry(5000, 40.0, 50.0)]);
        let reported = FuelStats {
            avg_consumption: Some(31.5),
            ..FuelStats::default()
        };
        let merged = merge_reported(computed, Some(&reported));
        assert_eq!(merged.avg_consumption, Some(31.5));
        assert_eq!(merged.total_fuel_liters, 40.0);
    }
}
