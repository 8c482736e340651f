use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    api::ors::Ors,
    geo::GeoPoint,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
    sim::FleetConfig,
    vehicle::{VehicleParameters, VehicleType},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Simulate a single trip, re-routing through charging stations as needed.
    #[clap(name = "ride")]
    Ride(Box<RideArgs>),

    /// Simulate a fleet of vehicles concurrently.
    #[clap(name = "fleet")]
    Fleet(Box<FleetArgs>),

    /// Inspect the charging-station registry.
    #[clap(name = "stations")]
    Stations(StationsArgs),
}

#[derive(Parser)]
pub struct RideArgs {
    /// Trip waypoints as `lon,lat` pairs, origin first.
    #[clap(num_args = 2.., required = true, value_name = "LON,LAT", allow_hyphen_values = true)]
    pub waypoints: Vec<GeoPoint>,

    #[clap(flatten)]
    pub vehicle: VehicleArgs,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub router: RouterArgs,

    #[clap(flatten)]
    pub stations: StationsFileArgs,

    /// Write the outcome JSON here instead of standard output.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FleetArgs {
    /// JSON file with one `{"vehicle_id", "waypoints"}` entry per vehicle.
    #[clap(long = "fleet-file", env = "FLEET_FILE")]
    pub fleet_file: PathBuf,

    #[clap(flatten)]
    pub vehicle: VehicleArgs,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub router: RouterArgs,

    #[clap(flatten)]
    pub stations: StationsFileArgs,

    /// Write the per-vehicle reports here instead of standard output.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

impl FleetArgs {
    pub fn fleet_config(&self) -> Result<FleetConfig> {
        Ok(FleetConfig {
            vehicle: self.vehicle.parameters()?,
            battery_capacity: self.battery.capacity,
            low_soc_threshold: self.battery.low_soc_threshold,
            charger_power: self.battery.charger_power(),
        })
    }
}

#[derive(Parser)]
pub struct StationsArgs {
    #[clap(flatten)]
    pub stations: StationsFileArgs,

    #[command(subcommand)]
    pub command: StationsCommand,
}

#[derive(Subcommand)]
pub enum StationsCommand {
    /// Pick the charging stop for a given position and destination.
    Nearest(NearestArgs),
}

#[derive(Parser)]
pub struct NearestArgs {
    /// Current position as `lon,lat`.
    #[clap(allow_hyphen_values = true)]
    pub position: GeoPoint,

    /// Trip destination as `lon,lat`.
    #[clap(allow_hyphen_values = true)]
    pub destination: GeoPoint,
}

#[derive(Parser)]
pub struct StationsFileArgs {
    /// JSON registry of charging stations.
    #[clap(long = "stations-file", env = "STATIONS_FILE")]
    pub stations_file: PathBuf,
}

#[derive(Parser)]
pub struct VehicleArgs {
    #[clap(long = "vehicle-type", value_enum, default_value = "electric", env = "VEHICLE_TYPE")]
    pub vehicle_type: VehicleType,

    /// TOML vehicle-parameter file; takes precedence over the type presets.
    #[clap(long = "parameters-file", env = "VEHICLE_PARAMETERS_FILE")]
    pub parameters_file: Option<PathBuf>,

    /// Combustion share of the traction power, overriding the type's default.
    #[clap(long = "hybrid-contribution", env = "HYBRID_CONTRIBUTION")]
    pub hybrid_contribution: Option<f64>,
}

impl VehicleArgs {
    pub fn parameters(&self) -> Result<VehicleParameters> {
        let mut parameters = match &self.parameters_file {
            Some(path) => VehicleParameters::from_toml_path(path)?,
            None => VehicleParameters::for_type(self.vehicle_type),
        };
        if let Some(hybrid_contribution) = self.hybrid_contribution {
            parameters.hybrid_contribution = hybrid_contribution;
        }
        parameters.validate()?;
        Ok(parameters)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Battery capacity in kilowatt-hours.
    #[clap(long = "battery-capacity-kwh", default_value = "2.5", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// State-of-charge fraction below which the vehicle diverts to a charger.
    #[clap(long = "low-soc-threshold", default_value = "0.2", env = "LOW_SOC_THRESHOLD")]
    pub low_soc_threshold: f64,

    /// Charger power in kilowatts.
    #[clap(long = "charger-power-kilowatts", default_value = "3.5", env = "CHARGER_POWER_KILOWATTS")]
    pub charger_power_kilowatts: f64,
}

impl BatteryArgs {
    pub fn charger_power(self) -> Watts {
        Watts::from_kilowatts(self.charger_power_kilowatts)
    }
}

#[derive(Parser)]
pub struct RouterArgs {
    /// OpenRouteService API token.
    #[clap(long = "ors-token", env = "ORS_TOKEN")]
    pub token: String,

    #[clap(
        long = "ors-base-url",
        default_value = "https://api.openrouteservice.org",
        env = "ORS_BASE_URL"
    )]
    pub base_url: String,

    /// ORS routing profile.
    #[clap(long = "ors-profile", default_value = "driving-car", env = "ORS_PROFILE")]
    pub profile: String,

    /// Intermediate samples interpolated between consecutive route points.
    #[clap(long, default_value = "2", env = "DENSIFY")]
    pub densify: usize,
}

impl RouterArgs {
    pub fn try_new_router(&self) -> Result<Ors> {
        Ors::try_new(self.token.clone(), self.base_url.clone(), self.profile.clone(), self.densify)
    }
}
