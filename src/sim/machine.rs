//! The per-vehicle simulation state machine.

use bon::Builder;

use crate::{
    api::Router,
    battery::Battery,
    dynamics,
    error::SimulationError,
    geo::GeoPoint,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts, time::Seconds},
    route::{Itinerary, RouteSegment},
    sim::{
        charge::ChargeEvent,
        outcome::{Geometry, Outcome, Properties, Summary},
    },
    stations::{ChargingStation, StationDirectory},
    vehicle::VehicleParameters,
};

/// What one [`Simulation::advance`] call tells the driving loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Signal {
    /// All segments are exhausted; collect the results.
    Finished,

    /// One point consumed (or one segment boundary crossed); keep going.
    Continue,

    /// The state of charge crossed the threshold at the current position.
    /// The driving loop must fetch and splice a charging detour, then keep
    /// calling [`Simulation::advance`].
    LowBattery,
}

/// One vehicle's simulation context. Owns the itinerary cursor, the battery
/// ledger, and the accumulating telemetry; mutated exclusively through
/// [`Simulation::advance`] and the detour splice.
#[derive(Builder)]
pub struct Simulation {
    itinerary: Itinerary,
    vehicle: VehicleParameters,
    battery: Battery,

    /// Fraction of the capacity below which a charging detour is triggered.
    low_soc_threshold: f64,

    /// Fixed charger power, used only to derive charge durations.
    charger_power: Watts,

    /// Set from the low-battery trigger until the charge resolves at a
    /// segment boundary; guards against re-entrant detours.
    #[builder(skip)]
    in_charge: bool,

    #[builder(skip)]
    trajectory: Vec<GeoPoint>,
    #[builder(skip)]
    power_history: Vec<Watts>,
    #[builder(skip)]
    soc_history: Vec<KilowattHours>,
    #[builder(skip)]
    charge_events: Vec<ChargeEvent>,

    /// Metres, accumulated from segment metadata at boundaries.
    #[builder(skip)]
    distance: f64,

    /// Seconds, same source.
    #[builder(skip)]
    duration: f64,

    #[builder(skip)]
    total_electric: KilowattHours,
    #[builder(skip)]
    total_combustion: KilowattHours,
}

impl Simulation {
    fn validate(&self) -> Result<(), SimulationError> {
        self.vehicle.validate()?;
        // A threshold of 1 can never be satisfied: the first consuming step
        // after a refill drops below capacity again and the vehicle reroutes
        // forever.
        if !(0.0..1.0).contains(&self.low_soc_threshold) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "low-SOC threshold must be a fraction in [0, 1), got {}",
                self.low_soc_threshold,
            )));
        }
        if self.charger_power <= Watts::ZERO {
            return Err(SimulationError::InvalidConfiguration(format!(
                "charger power must be positive, got {}",
                self.charger_power,
            )));
        }
        Ok(())
    }

    /// One step of the state machine.
    pub fn advance(&mut self) -> Signal {
        if !self.consume_step() {
            // Segment exhausted: account its metadata and move the cursor on.
            if let Some(segment) = self.itinerary.current_segment() {
                self.distance += segment.distance;
                self.duration += segment.duration;
            }
            if !self.itinerary.advance_segment() {
                return Signal::Finished;
            }
            if self.in_charge {
                self.resolve_charge();
            }
            return Signal::Continue;
        }

        if !self.in_charge && self.battery.is_low(self.low_soc_threshold) {
            self.in_charge = true;
            return Signal::LowBattery;
        }

        self.itinerary.advance_point();
        Signal::Continue
    }

    /// Consume the point under the cursor: run the dynamics model, integrate
    /// the draw into the battery, and record the telemetry. Returns `false`
    /// when the current segment is exhausted.
    fn consume_step(&mut self) -> bool {
        let Some(point) = self.itinerary.current_point() else {
            return false;
        };
        let previous_speed = self.itinerary.previous_speed();
        let time_delta = self.itinerary.current_time_delta();

        let draw =
            dynamics::power_draw(point.speed, point.grade, previous_speed, time_delta, &self.vehicle);

        let time_delta = Seconds::from(time_delta);
        let soc = self.battery.consume(draw.electric, time_delta);
        self.total_electric += draw.electric * time_delta;
        self.total_combustion += draw.combustion * time_delta;

        self.soc_history.push(soc);
        self.power_history.push(draw.electric);
        self.trajectory.push(point.position);
        true
    }

    fn resolve_charge(&mut self) {
        let delivered = self.battery.charge_full();
        // The SOC trace shows the refill the moment it happens.
        self.soc_history.push(self.battery.soc());
        if let Some(event) = self.charge_events.last_mut() {
            event.resolve(delivered, self.charger_power);
            info!(station = %event.station_name, %delivered, "Recharged");
        }
        self.in_charge = false;
    }

    /// Position at the cursor, falling back to the last visited point.
    pub fn current_position(&self) -> Option<GeoPoint> {
        self.itinerary
            .current_point()
            .map(|point| point.position)
            .or_else(|| self.trajectory.last().copied())
    }

    /// Destination of the leg under the cursor.
    pub fn current_destination(&self) -> Option<GeoPoint> {
        self.itinerary.current_destination()
    }

    fn open_charge_event(&mut self, station: &ChargingStation, detour_position: GeoPoint) {
        info!(station = %station.name, %detour_position, "Battery low, detouring to charge");
        self.charge_events.push(ChargeEvent::open(station, detour_position));
    }

    /// Splice the fetched detour into the itinerary. The truncated leg never
    /// reaches its own boundary, so its consumed share is accounted here,
    /// pro-rata by points.
    fn splice_detour(&mut self, detour: Vec<RouteSegment>) {
        if let Some(segment) = self.itinerary.current_segment() {
            let fraction = self.itinerary.consumed_fraction();
            self.distance += segment.distance * fraction;
            self.duration += segment.duration * fraction;
        }
        self.itinerary.splice(detour);
        debug!(remaining_points = self.itinerary.remaining_points(), "Spliced the detour");
    }

    /// Drive the state machine to completion, fetching charging detours on
    /// demand. On error the telemetry accumulated so far stays available
    /// through [`Simulation::into_outcome`].
    #[instrument(skip_all)]
    pub async fn run(
        &mut self,
        stations: &StationDirectory,
        router: &dyn Router,
    ) -> Result<(), SimulationError> {
        self.validate()?;
        loop {
            match self.advance() {
                Signal::Finished => {
                    info!(
                        distance = self.distance,
                        duration = self.duration,
                        n_charges = self.charge_events.len(),
                        "Route exhausted",
                    );
                    return Ok(());
                }
                Signal::Continue => {}
                Signal::LowBattery => {
                    let position = self.current_position().ok_or_else(|| {
                        SimulationError::InvalidConfiguration("the itinerary is empty".to_string())
                    })?;
                    // The detour must rejoin the plan at the current leg's
                    // end: the tail legs still follow, so routing any further
                    // would ride them twice.
                    let destination = self.current_destination().ok_or_else(|| {
                        SimulationError::InvalidConfiguration(
                            "the itinerary has no destination".to_string(),
                        )
                    })?;
                    let station_index =
                        stations.nearest_towards_destination(position, destination)?;
                    let station = &stations[station_index];
                    self.open_charge_event(station, position);
                    let detour =
                        router.fetch_route(&[position, station.location, destination]).await?;
                    self.splice_detour(detour);
                }
            }
        }
    }

    pub fn into_outcome(self) -> Outcome {
        let summary = Summary::new(
            self.distance,
            self.duration,
            self.total_electric,
            self.total_combustion,
            self.itinerary.degenerate_time_deltas(),
        );
        Outcome {
            geometry: Geometry {
                type_: "LineString",
                coordinates: self.trajectory.iter().map(|point| point.lon_lat()).collect(),
            },
            properties: Properties { power: self.power_history, soc: self.soc_history },
            summary,
            charge_points: self.charge_events,
        }
    }
}
