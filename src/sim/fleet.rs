//! Fleet-level simulation: one independent task per vehicle, sharing only
//! the read-only station directory and router.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
    api::Router,
    battery::Battery,
    error::SimulationError,
    geo::GeoPoint,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
    route::Itinerary,
    sim::{machine::Simulation, outcome::Outcome},
    stations::StationDirectory,
    vehicle::VehicleParameters,
};

/// One entry of the fleet input file.
#[derive(Clone, Debug, Deserialize)]
pub struct FleetVehicle {
    pub vehicle_id: String,
    pub waypoints: Vec<GeoPoint>,
}

/// Per-fleet simulation settings, identical for every vehicle.
#[derive(Copy, Clone, Debug)]
pub struct FleetConfig {
    pub vehicle: VehicleParameters,
    pub battery_capacity: KilowattHours,
    pub low_soc_threshold: f64,
    pub charger_power: Watts,
}

/// Result of one vehicle's simulation. A failed vehicle still carries the
/// telemetry accumulated up to the failure point.
#[derive(Debug, Serialize)]
pub struct VehicleReport {
    pub vehicle_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub outcome: Outcome,
}

/// Simulate the whole fleet concurrently. One vehicle's failure never
/// discards the others' results.
#[instrument(skip_all, fields(n_vehicles = vehicles.len()))]
pub async fn run_fleet(
    vehicles: Vec<FleetVehicle>,
    config: FleetConfig,
    stations: Arc<StationDirectory>,
    router: Arc<dyn Router>,
) -> Vec<VehicleReport> {
    let mut tasks = JoinSet::new();
    for vehicle in vehicles {
        let stations = Arc::clone(&stations);
        let router = Arc::clone(&router);
        tasks.spawn(async move { simulate_vehicle(vehicle, config, &stations, &*router).await });
    }
    let mut reports = tasks.join_all().await;
    reports.sort_by(|lhs, rhs| lhs.vehicle_id.cmp(&rhs.vehicle_id));
    reports
}

#[instrument(skip_all, fields(vehicle_id = %vehicle.vehicle_id))]
async fn simulate_vehicle(
    vehicle: FleetVehicle,
    config: FleetConfig,
    stations: &StationDirectory,
    router: &dyn Router,
) -> VehicleReport {
    match try_simulate(&vehicle, config, stations, router).await {
        Ok((outcome, error)) => {
            if let Some(error) = &error {
                warn!(error = %error, "Vehicle simulation failed, keeping partial results");
            }
            VehicleReport { vehicle_id: vehicle.vehicle_id, error, outcome }
        }
        Err(error) => {
            warn!(error = %error, "Vehicle simulation could not start");
            VehicleReport {
                vehicle_id: vehicle.vehicle_id,
                error: Some(error.to_string()),
                outcome: Outcome::default(),
            }
        }
    }
}

/// Fetch the initial route and drive the simulation. A mid-trip error is
/// returned alongside the partial outcome; a setup error aborts outright.
async fn try_simulate(
    vehicle: &FleetVehicle,
    config: FleetConfig,
    stations: &StationDirectory,
    router: &dyn Router,
) -> Result<(Outcome, Option<String>), SimulationError> {
    let segments = router.fetch_route(&vehicle.waypoints).await?;
    let mut simulation = Simulation::builder()
        .itinerary(Itinerary::new(segments))
        .vehicle(config.vehicle)
        .battery(Battery::try_new(config.battery_capacity)?)
        .low_soc_threshold(config.low_soc_threshold)
        .charger_power(config.charger_power)
        .build();
    let error = simulation.run(stations, router).await.err().map(|error| error.to_string());
    Ok((simulation.into_outcome(), error))
}
