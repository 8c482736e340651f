mod charge;
mod fleet;
mod machine;
mod outcome;

pub use self::{
    charge::ChargeEvent,
    fleet::{FleetConfig, FleetVehicle, VehicleReport, run_fleet},
    machine::{Signal, Simulation},
    outcome::{Outcome, Summary},
};

#[cfg(test)]
pub mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::{api::Router, error::SimulationError, geo::GeoPoint, route::RouteSegment};

    /// Test double: hands out a canned detour (or fails every call) and
    /// records the waypoints it was asked to route through.
    pub struct StubRouter {
        segments: Vec<RouteSegment>,
        fail: bool,
        requests: Mutex<Vec<Vec<GeoPoint>>>,
    }

    impl StubRouter {
        pub fn with_segments(segments: Vec<RouteSegment>) -> Self {
            Self { segments, fail: false, requests: Mutex::new(Vec::new()) }
        }

        pub fn failing() -> Self {
            Self { segments: Vec::new(), fail: true, requests: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<Vec<GeoPoint>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Router for StubRouter {
        async fn fetch_route(
            &self,
            waypoints: &[GeoPoint],
        ) -> Result<Vec<RouteSegment>, SimulationError> {
            self.requests.lock().unwrap().push(waypoints.to_vec());
            if self.fail {
                return Err(SimulationError::RoutingFailure(anyhow::anyhow!(
                    "stub router is configured to fail"
                )));
            }
            Ok(self.segments.clone())
        }
    }
}
