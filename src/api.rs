pub mod ors;

use async_trait::async_trait;

use crate::{error::SimulationError, geo::GeoPoint, route::RouteSegment};

/// The routing seam. The simulation core only ever asks for "segments
/// through these waypoints", both for the initial itinerary and for charging
/// detours (`current position → station → destination`).
#[async_trait]
pub trait Router: Send + Sync {
    async fn fetch_route(
        &self,
        waypoints: &[GeoPoint],
    ) -> Result<Vec<RouteSegment>, SimulationError>;
}
