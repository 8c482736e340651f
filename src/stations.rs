use std::path::Path;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{error::SimulationError, geo::GeoPoint, prelude::*};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChargingStation {
    pub name: String,
    pub location: GeoPoint,
}

/// Fixed registry of charging stations, shared read-only by all vehicles of a
/// fleet.
#[derive(Clone, Debug, Default, Deserialize, Serialize, derive_more::Index)]
#[serde(transparent)]
pub struct StationDirectory(Vec<ChargingStation>);

impl StationDirectory {
    pub const fn new(stations: Vec<ChargingStation>) -> Self {
        Self(stations)
    }

    /// Load the JSON registry produced by the siting pipeline.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read `{}`", path.as_ref().display()))?;
        let directory: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.as_ref().display()))?;
        info!(n_stations = directory.len(), "Loaded station registry");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the station closest to `position` outright. Kept for
    /// comparison only; detours use [`Self::nearest_towards_destination`].
    #[allow(dead_code)]
    pub fn nearest(&self, position: GeoPoint) -> Result<usize, SimulationError> {
        self.0
            .iter()
            .enumerate()
            .min_by_key(|(_, station)| OrderedFloat(position.distance_to(station.location)))
            .map(|(index, _)| index)
            .ok_or_else(Self::empty_error)
    }

    /// Index of the station minimizing the total detour
    /// `position → station → destination`, so a low battery never pulls the
    /// vehicle towards a station that is close but in the wrong direction.
    pub fn nearest_towards_destination(
        &self,
        position: GeoPoint,
        destination: GeoPoint,
    ) -> Result<usize, SimulationError> {
        self.0
            .iter()
            .enumerate()
            .min_by_key(|(_, station)| {
                OrderedFloat(
                    position.distance_to(station.location)
                        + station.location.distance_to(destination),
                )
            })
            .map(|(index, _)| index)
            .ok_or_else(Self::empty_error)
    }

    fn empty_error() -> SimulationError {
        SimulationError::InvalidConfiguration(
            "the station directory is empty, cannot select a charging stop".to_string(),
        )
    }
}
