//! [OpenRouteService](https://openrouteservice.org/) directions client.

use std::time::Duration;

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    api::Router,
    error::SimulationError,
    geo::GeoPoint,
    prelude::*,
    route::{RoutePoint, RouteSegment},
};

const MAX_ATTEMPTS: usize = 3;

pub struct Ors {
    client: Client,
    token: String,
    base_url: String,
    profile: String,

    /// Intermediate samples interpolated between consecutive route points.
    densify: usize,
}

impl Ors {
    pub fn try_new(
        token: String,
        base_url: String,
        profile: String,
        densify: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent("colibri")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, token, base_url, profile, densify })
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(n_waypoints = waypoints.len()))]
    async fn call(&self, waypoints: &[GeoPoint]) -> Result<Feature> {
        // ORS rejects 3-D waypoints, so strip the altitudes.
        let coordinates: Vec<[f64; 2]> = waypoints.iter().map(|point| point.lon_lat()).collect();
        let request = DirectionsRequest {
            coordinates: &coordinates,
            elevation: true,
            instructions: true,
            geometry: true,
        };
        let url = format!("{}/v2/directions/{}/geojson", self.base_url, self.profile);
        let response: DirectionsResponse = self
            .client
            .post(&url)
            .header("Authorization", &self.token)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to call `{url}`"))?
            .error_for_status()
            .with_context(|| format!("`{url}` failed"))?
            .json()
            .await
            .context("failed to deserialize the directions response")?;
        response.features.into_iter().next().context("the response contains no routes")
    }
}

#[async_trait]
impl Router for Ors {
    #[instrument(
        skip_all,
        fields(waypoints = %waypoints.iter().format(" → ")),
    )]
    async fn fetch_route(
        &self,
        waypoints: &[GeoPoint],
    ) -> Result<Vec<RouteSegment>, SimulationError> {
        if waypoints.len() < 2 {
            return Err(SimulationError::RoutingFailure(anyhow::anyhow!(
                "a route needs at least 2 waypoints, got {}",
                waypoints.len(),
            )));
        }
        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.call(waypoints).await {
                Ok(feature) => return decode_feature(feature, self.densify),
                Err(error) => {
                    warn!(attempt, error = format!("{error:#}"), "Routing attempt failed");
                    last_error = Some(error);
                }
            }
        }
        Err(SimulationError::RoutingFailure(
            last_error.unwrap_or_else(|| anyhow::anyhow!("no routing attempts were made")),
        ))
    }
}

/// Turn one directions feature into simulation-ready segments: per-step
/// uniform speeds, elevation-derived grades, and cumulative timestamps, the
/// shape the dynamics model consumes.
fn decode_feature(feature: Feature, densify: usize) -> Result<Vec<RouteSegment>, SimulationError> {
    let coordinates = &feature.geometry.coordinates;
    let mut segments = Vec::with_capacity(feature.properties.segments.len());

    for segment in &feature.properties.segments {
        let mut points: Vec<RoutePoint> = Vec::new();
        let mut elapsed = 0.0;
        let mut last_speed = 0.0;
        let mut last_index = 0;

        for step in &segment.steps {
            let [start, end] = step.way_points;
            let span = end.saturating_sub(start);
            if span == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let duration_per_point = step.duration / span as f64;
            #[allow(clippy::cast_precision_loss)]
            let distance_per_point = step.distance / span as f64;
            let speed = if duration_per_point > 0.0 {
                distance_per_point / duration_per_point
            } else {
                0.0
            };

            for index in start..end.min(coordinates.len()) {
                let position = coordinates[index];
                let previous = points.last().map_or(position, |point| point.position);
                points.push(RoutePoint {
                    position,
                    speed,
                    grade: grade_degrees(previous, position),
                    elapsed,
                });
                elapsed += duration_per_point;
            }
            last_speed = speed;
            last_index = end;
        }

        // The steps' ranges are end-exclusive: close the segment with its
        // final geometry point.
        if let Some(&position) = coordinates.get(last_index) {
            let previous = points.last().map_or(position, |point| point.position);
            points.push(RoutePoint {
                position,
                speed: last_speed,
                grade: grade_degrees(previous, position),
                elapsed,
            });
        }

        let mut segment =
            RouteSegment { points, distance: segment.distance, duration: segment.duration };
        segment.densify(densify);
        segments.push(segment);
    }

    if segments.iter().all(|segment| segment.points.len() < 2) {
        return Err(SimulationError::RoutingFailure(anyhow::anyhow!(
            "the provider returned a degenerate route"
        )));
    }
    Ok(segments)
}

/// Road grade between two samples, degrees, from the altitude delta over the
/// great-circle run. Zero when either altitude is missing or the run is zero.
fn grade_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    let run = from.distance_to(to);
    if run == 0.0 {
        return 0.0;
    }
    match (from.altitude, to.altitude) {
        (Some(from), Some(to)) => (to - from).atan2(run).to_degrees(),
        _ => 0.0,
    }
}

#[derive(Serialize)]
struct DirectionsRequest<'a> {
    coordinates: &'a [[f64; 2]],
    elevation: bool,
    instructions: bool,
    geometry: bool,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct Segment {
    /// Metres.
    distance: f64,

    /// Seconds.
    duration: f64,

    steps: Vec<Step>,
}

#[derive(Deserialize)]
struct Step {
    distance: f64,
    duration: f64,

    /// Start and end indices into the feature's geometry.
    way_points: [usize; 2],
}

#[derive(Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<GeoPoint>,
}
