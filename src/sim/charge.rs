use serde::Serialize;

use crate::{
    geo::GeoPoint,
    quantity::{energy::KilowattHours, power::Watts, time::Seconds},
    stations::ChargingStation,
};

/// One charging stop. Opened the moment the detour is triggered; the energy
/// figures stay empty until the vehicle actually reaches the station and the
/// charge resolves.
#[derive(Clone, Debug, Serialize)]
pub struct ChargeEvent {
    pub station_name: String,
    pub station_location: GeoPoint,

    /// Where the vehicle was when the low battery triggered the detour.
    pub detour_position: GeoPoint,

    /// Energy delivered, kWh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_delivered: Option<KilowattHours>,

    /// Time at the charger, derived from the configured charger power.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_duration: Option<Seconds>,
}

impl ChargeEvent {
    pub fn open(station: &ChargingStation, detour_position: GeoPoint) -> Self {
        Self {
            station_name: station.name.clone(),
            station_location: station.location,
            detour_position,
            energy_delivered: None,
            charge_duration: None,
        }
    }

    pub fn resolve(&mut self, delivered: KilowattHours, charger_power: Watts) {
        self.energy_delivered = Some(delivered);
        self.charge_duration = Some(delivered / charger_power);
    }

    pub const fn is_resolved(&self) -> bool {
        self.energy_delivered.is_some()
    }
}
