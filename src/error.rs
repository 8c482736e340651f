/// Errors a single vehicle's simulation can surface to its caller.
///
/// Degenerate route data is deliberately absent here: it is handled locally
/// with a nominal time delta and only counted (see [`crate::route`]).
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The simulation cannot start: empty station directory, non-positive
    /// battery capacity, malformed vehicle parameters, and the like.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The router produced no usable route for a requested waypoint sequence.
    /// Fatal for the affected vehicle, recoverable at the fleet level.
    #[error("routing failed: {0:#}")]
    RoutingFailure(#[source] anyhow::Error),
}
