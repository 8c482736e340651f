//! Route segments and the itinerary cursor the simulation steps through.

use crate::{geo::GeoPoint, prelude::*};

/// Fallback time delta when the very first sample carries no usable
/// timestamp, seconds.
const NOMINAL_TIME_DELTA: f64 = 1.0;

/// Floor on the delta between consecutive samples, seconds.
const MIN_TIME_DELTA: f64 = 0.1;

/// One sampled point of a route leg.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub position: GeoPoint,

    /// Instantaneous speed, m/s.
    pub speed: f64,

    /// Road grade, degrees.
    pub grade: f64,

    /// Elapsed time since the start of the segment, seconds.
    pub elapsed: f64,
}

/// One leg of travel as reported by the routing provider: an ordered point
/// sequence plus the provider's own distance and duration totals.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSegment {
    pub points: Vec<RoutePoint>,

    /// Provider-reported length, metres.
    pub distance: f64,

    /// Provider-reported travel time, seconds.
    pub duration: f64,
}

impl RouteSegment {
    pub fn destination(&self) -> Option<GeoPoint> {
        self.points.last().map(|point| point.position)
    }

    /// Insert `intermediate` linearly interpolated samples between every pair
    /// of consecutive points. Leaves segments of fewer than 2 points alone.
    pub fn densify(&mut self, intermediate: usize) {
        if intermediate == 0 || self.points.len() < 2 {
            return;
        }
        let mut points = Vec::with_capacity(
            self.points.len() + (self.points.len() - 1) * intermediate,
        );
        for window in self.points.windows(2) {
            let [from, to] = window else { unreachable!() };
            points.push(*from);
            for step in 1..=intermediate {
                #[allow(clippy::cast_precision_loss)]
                let t = step as f64 / (intermediate + 1) as f64;
                points.push(RoutePoint {
                    position: GeoPoint {
                        lon: from.position.lon + (to.position.lon - from.position.lon) * t,
                        lat: from.position.lat + (to.position.lat - from.position.lat) * t,
                        altitude: match (from.position.altitude, to.position.altitude) {
                            (Some(a), Some(b)) => Some(a + (b - a) * t),
                            _ => None,
                        },
                    },
                    speed: from.speed + (to.speed - from.speed) * t,
                    grade: from.grade + (to.grade - from.grade) * t,
                    elapsed: from.elapsed + (to.elapsed - from.elapsed) * t,
                });
            }
        }
        if let Some(&last) = self.points.last() {
            points.push(last);
        }
        self.points = points;
    }

    /// Time delta between the point at `index` and its predecessor.
    /// Returns the delta and whether the fallback kicked in because the
    /// timestamps were degenerate. A zero timestamp at index 0 is well
    /// formed (the segment simply starts at its first sample), so it takes
    /// the nominal delta without being counted.
    fn time_delta(&self, index: usize) -> (f64, bool) {
        if index == 0 {
            let first = self.points[0].elapsed;
            if first > 0.0 { (first, false) } else { (NOMINAL_TIME_DELTA, false) }
        } else {
            let delta = self.points[index].elapsed - self.points[index - 1].elapsed;
            if delta > 0.0 { (delta.max(MIN_TIME_DELTA), false) } else { (MIN_TIME_DELTA, true) }
        }
    }
}

/// The vehicle's full plan: an append-only segment arena plus a cursor.
/// A reroute never rewrites consumed history, it truncates the current
/// segment's tail and inserts the detour right after it.
#[derive(Debug, Default)]
pub struct Itinerary {
    segments: Vec<RouteSegment>,
    segment_index: usize,
    point_index: usize,
    degenerate_time_deltas: usize,
}

impl Itinerary {
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        let itinerary = Self { segments, ..Self::default() };
        itinerary.warn_short(0);
        itinerary
    }

    fn warn_short(&self, from: usize) {
        let count = self.segments[from..]
            .iter()
            .filter(|segment| segment.points.len() < 2)
            .count();
        if count > 0 {
            warn!(count, "segments with fewer than 2 points; upstream data quality suspect");
        }
    }

    pub fn current_segment(&self) -> Option<&RouteSegment> {
        self.segments.get(self.segment_index)
    }

    /// The point under the cursor, or `None` when the current segment is
    /// exhausted.
    pub fn current_point(&self) -> Option<RoutePoint> {
        self.current_segment()?.points.get(self.point_index).copied()
    }

    /// Speed at the cursor's predecessor; zero at a segment start.
    pub fn previous_speed(&self) -> f64 {
        if self.point_index == 0 {
            0.0
        } else {
            self.current_segment()
                .map_or(0.0, |segment| segment.points[self.point_index - 1].speed)
        }
    }

    /// Time delta at the cursor, with the degenerate-timestamp fallback
    /// applied and counted.
    pub fn current_time_delta(&mut self) -> f64 {
        let Some(segment) = self.segments.get(self.segment_index) else {
            return NOMINAL_TIME_DELTA;
        };
        let (delta, degenerate) = segment.time_delta(self.point_index);
        if degenerate {
            self.degenerate_time_deltas += 1;
            debug!(
                segment_index = self.segment_index,
                point_index = self.point_index,
                "non-increasing timestamps, using the nominal delta",
            );
        }
        delta
    }

    pub fn advance_point(&mut self) {
        self.point_index += 1;
    }

    /// Move the cursor to the start of the next segment. Returns `false` when
    /// no segments remain.
    pub fn advance_segment(&mut self) -> bool {
        self.segment_index += 1;
        self.point_index = 0;
        self.segment_index < self.segments.len()
    }

    /// Fraction of the current segment's points already consumed, for
    /// pro-rata accounting of a truncated leg.
    pub fn consumed_fraction(&self) -> f64 {
        self.current_segment().map_or(1.0, |segment| {
            if segment.points.is_empty() {
                1.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                let fraction = (self.point_index + 1) as f64 / segment.points.len() as f64;
                fraction.min(1.0)
            }
        })
    }

    /// Discard the remainder of the current segment past the cursor, insert
    /// the detour segments right after it, and park the cursor at the start
    /// of the inserted material.
    pub fn splice(&mut self, detour: Vec<RouteSegment>) {
        if let Some(segment) = self.segments.get_mut(self.segment_index) {
            segment.points.truncate(self.point_index + 1);
        }
        let insert_at = (self.segment_index + 1).min(self.segments.len());
        self.segments.splice(insert_at..insert_at, detour);
        self.segment_index = insert_at;
        self.point_index = 0;
        self.warn_short(insert_at);
    }

    /// Final destination of the whole plan.
    pub fn final_destination(&self) -> Option<GeoPoint> {
        self.segments.iter().rev().find_map(RouteSegment::destination)
    }

    /// Destination of the leg under the cursor. A detour rejoins the plan
    /// here, so the tail legs after the current one are ridden exactly once.
    pub fn current_destination(&self) -> Option<GeoPoint> {
        self.current_segment()
            .and_then(RouteSegment::destination)
            .or_else(|| self.final_destination())
    }

    pub const fn degenerate_time_deltas(&self) -> usize {
        self.degenerate_time_deltas
    }

    pub fn remaining_points(&self) -> usize {
        self.segments[self.segment_index.min(self.segments.len())..]
            .iter()
            .map(|segment| segment.points.len())
            .sum::<usize>()
            .saturating_sub(self.point_index)
    }
}

#[cfg(test)]
pub mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// A flat constant-speed segment with 1-second sampling.
    #[allow(clippy::cast_precision_loss)]
    pub fn flat_segment(n_points: usize, speed: f64) -> RouteSegment {
        let points = (0..n_points)
            .map(|index| RoutePoint {
                position: GeoPoint::new(-75.57 + index as f64 * 1e-4, 6.25),
                speed,
                grade: 0.0,
                elapsed: index as f64,
            })
            .collect();
        RouteSegment { points, distance: speed * n_points as f64, duration: n_points as f64 }
    }

    #[test]
    fn test_time_delta_first_point_fallback() {
        let mut segment = flat_segment(3, 10.0);
        segment.points[0].elapsed = 0.0;
        // Nominal delta, but not counted as degenerate: starting at zero is
        // the providers' normal shape.
        assert_eq!(segment.time_delta(0), (NOMINAL_TIME_DELTA, false));
    }

    #[test]
    fn test_time_delta_non_increasing_fallback() {
        let mut segment = flat_segment(3, 10.0);
        segment.points[2].elapsed = segment.points[1].elapsed;
        assert_eq!(segment.time_delta(2), (MIN_TIME_DELTA, true));
        assert_eq!(segment.time_delta(1), (1.0, false));
    }

    #[test]
    fn test_densify_point_count() {
        let mut segment = flat_segment(4, 10.0);
        segment.densify(2);
        assert_eq!(segment.points.len(), 4 + 3 * 2);
        // Endpoints survive untouched.
        assert_relative_eq!(segment.points[0].elapsed, 0.0);
        assert_relative_eq!(segment.points.last().unwrap().elapsed, 3.0);
        // Interpolated timestamps stay monotonic.
        for window in segment.points.windows(2) {
            assert!(window[1].elapsed >= window[0].elapsed);
        }
    }

    #[test]
    fn test_densify_short_segment_untouched() {
        let mut segment = flat_segment(1, 10.0);
        segment.densify(5);
        assert_eq!(segment.points.len(), 1);
    }

    #[test]
    fn test_cursor_walk() {
        let mut itinerary = Itinerary::new(vec![flat_segment(2, 10.0), flat_segment(3, 10.0)]);
        assert!(itinerary.current_point().is_some());
        itinerary.advance_point();
        itinerary.advance_point();
        assert!(itinerary.current_point().is_none());
        assert!(itinerary.advance_segment());
        assert!(itinerary.current_point().is_some());
        assert_relative_eq!(itinerary.previous_speed(), 0.0);
        itinerary.advance_point();
        assert_relative_eq!(itinerary.previous_speed(), 10.0);
    }

    #[test]
    fn test_splice_truncates_and_inserts() {
        let mut itinerary = Itinerary::new(vec![flat_segment(5, 10.0), flat_segment(4, 10.0)]);
        itinerary.advance_point();
        itinerary.advance_point(); // cursor at point 2 of segment 0

        itinerary.splice(vec![flat_segment(2, 8.0), flat_segment(2, 8.0)]);

        // The old segment kept only the consumed prefix.
        assert_eq!(itinerary.segments[0].points.len(), 3);
        assert_eq!(itinerary.segments.len(), 4);
        // Cursor sits at the start of the detour.
        assert_eq!(itinerary.segment_index, 1);
        assert_eq!(itinerary.point_index, 0);
        assert_relative_eq!(itinerary.current_point().unwrap().speed, 8.0);
        // The original tail still follows the detour.
        assert_eq!(itinerary.segments[3].points.len(), 4);
    }

    #[test]
    fn test_final_destination_survives_splice() {
        let mut itinerary = Itinerary::new(vec![flat_segment(5, 10.0)]);
        let destination = itinerary.final_destination().unwrap();
        itinerary.advance_point();
        itinerary.splice(vec![flat_segment(2, 8.0)]);
        // Splicing with no trailing segment makes the detour the tail.
        assert_eq!(
            itinerary.final_destination().unwrap(),
            itinerary.segments[1].destination().unwrap(),
        );
        assert_ne!(itinerary.final_destination().unwrap(), destination);
    }

    #[test]
    fn test_current_destination_is_current_leg_end() {
        let mut itinerary = Itinerary::new(vec![flat_segment(3, 10.0), flat_segment(2, 10.0)]);
        assert_eq!(
            itinerary.current_destination().unwrap(),
            itinerary.segments[0].destination().unwrap(),
        );
        assert_ne!(itinerary.current_destination(), itinerary.final_destination());
        // On the last leg the two coincide.
        itinerary.advance_segment();
        assert_eq!(itinerary.current_destination(), itinerary.final_destination());
    }

    #[test]
    fn test_remaining_points() {
        let mut itinerary = Itinerary::new(vec![flat_segment(3, 10.0), flat_segment(2, 10.0)]);
        assert_eq!(itinerary.remaining_points(), 5);
        itinerary.advance_point();
        assert_eq!(itinerary.remaining_points(), 4);
    }
}
