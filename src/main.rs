mod api;
mod battery;
mod cli;
mod dynamics;
mod error;
mod geo;
mod prelude;
mod quantity;
mod route;
mod sim;
mod stations;
mod tables;
mod vehicle;

use std::{path::Path, sync::Arc};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    api::Router,
    battery::Battery,
    cli::{Args, Command, FleetArgs, RideArgs, StationsCommand},
    prelude::*,
    route::Itinerary,
    sim::{FleetVehicle, Simulation, run_fleet},
    stations::StationDirectory,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Args::parse().command {
        Command::Ride(args) => ride(*args).await,
        Command::Fleet(args) => fleet(*args).await,

        Command::Stations(args) => {
            let directory = StationDirectory::from_json_path(&args.stations.stations_file)?;
            match args.command {
                StationsCommand::Nearest(args) => {
                    let index =
                        directory.nearest_towards_destination(args.position, args.destination)?;
                    let station = &directory[index];
                    info!(
                        name = %station.name,
                        location = %station.location,
                        "Selected charging stop",
                    );
                    Ok(())
                }
            }
        }
    }
}

async fn ride(args: RideArgs) -> Result {
    let stations = StationDirectory::from_json_path(&args.stations.stations_file)?;
    let router = args.router.try_new_router()?;

    let segments = router.fetch_route(&args.waypoints).await?;
    let mut simulation = Simulation::builder()
        .itinerary(Itinerary::new(segments))
        .vehicle(args.vehicle.parameters()?)
        .battery(Battery::try_new(args.battery.capacity)?)
        .low_soc_threshold(args.battery.low_soc_threshold)
        .charger_power(args.battery.charger_power())
        .build();
    simulation.run(&stations, &router).await?;
    let outcome = simulation.into_outcome();

    println!("{}", tables::build_summary_table(&outcome.summary));
    if !outcome.charge_points.is_empty() {
        println!("{}", tables::build_charge_table(&outcome.charge_points));
    }
    write_json(&outcome, args.output.as_deref())
}

async fn fleet(args: FleetArgs) -> Result {
    let contents = std::fs::read_to_string(&args.fleet_file)
        .with_context(|| format!("failed to read `{}`", args.fleet_file.display()))?;
    let vehicles: Vec<FleetVehicle> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse `{}`", args.fleet_file.display()))?;

    let config = args.fleet_config()?;
    let stations = Arc::new(StationDirectory::from_json_path(&args.stations.stations_file)?);
    let router: Arc<dyn Router> = Arc::new(args.router.try_new_router()?);

    let reports = run_fleet(vehicles, config, stations, router).await;
    write_json(&reports, args.output.as_deref())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write `{}`", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
