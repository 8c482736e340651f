use serde::Serialize;

use crate::{
    quantity::{energy::KilowattHours, power::Watts},
    sim::charge::ChargeEvent,
};

/// Lifecycle CO₂-equivalent per kilometre for a fully electric motorcycle,
/// grams.
const ELECTRIC_EMISSIONS_G_PER_KM: f64 = 35.0;

/// Same, fully combustion.
const COMBUSTION_EMISSIONS_G_PER_KM: f64 = 70.0;

/// Calorific value of gasoline, kWh per gallon.
const GASOLINE_KWH_PER_GALLON: f64 = 33.7;

/// The shape consumed by the downstream mapping and reporting tools: one
/// trajectory, the per-step telemetry, the trip summary, and the charging
/// stops.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub geometry: Geometry,
    pub properties: Properties,
    pub summary: Summary,
    pub charge_points: Vec<ChargeEvent>,
}

impl Default for Outcome {
    fn default() -> Self {
        Self {
            geometry: Geometry { type_: "LineString", coordinates: Vec::new() },
            properties: Properties { power: Vec::new(), soc: Vec::new() },
            summary: Summary::new(
                0.0,
                0.0,
                KilowattHours::default(),
                KilowattHours::default(),
                0,
            ),
            charge_points: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct Properties {
    /// Instantaneous electric power, W, one entry per consumed point.
    pub power: Vec<Watts>,

    /// State of charge, kWh. Gets one extra entry per resolved charge,
    /// showing the refill the moment it happens.
    pub soc: Vec<KilowattHours>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    /// Metres, from the providers' segment metadata.
    pub distance: f64,

    /// Seconds, same source.
    pub duration: f64,

    pub electric_energy: KilowattHours,
    pub combustion_energy: KilowattHours,

    /// Gasoline equivalent of the combustion energy.
    pub fuel_gallons: f64,

    pub electric_emissions_kg: f64,
    pub combustion_emissions_kg: f64,

    /// How often the degenerate-timestamp fallback fired; non-zero values
    /// point at upstream data quality issues.
    pub degenerate_time_deltas: usize,
}

impl Summary {
    pub fn new(
        distance: f64,
        duration: f64,
        electric_energy: KilowattHours,
        combustion_energy: KilowattHours,
        degenerate_time_deltas: usize,
    ) -> Self {
        let distance_km = distance / 1000.0;
        Self {
            distance,
            duration,
            electric_energy,
            combustion_energy,
            fuel_gallons: combustion_energy.0 / GASOLINE_KWH_PER_GALLON,
            electric_emissions_kg: ELECTRIC_EMISSIONS_G_PER_KM * distance_km / 1000.0,
            combustion_emissions_kg: COMBUSTION_EMISSIONS_G_PER_KM * distance_km / 1000.0,
            degenerate_time_deltas,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_summary_derived_figures() {
        let summary =
            Summary::new(10_000.0, 1200.0, KilowattHours::from(0.4), KilowattHours::from(33.7), 0);
        assert_relative_eq!(summary.fuel_gallons, 1.0);
        assert_relative_eq!(summary.electric_emissions_kg, 0.35);
        assert_relative_eq!(summary.combustion_emissions_kg, 0.7);
    }
}
