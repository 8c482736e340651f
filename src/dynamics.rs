//! Point-by-point traction force and power model.
//!
//! Pure and deterministic: one route sample in, one pair of power draws out.
//! Braking energy is discarded, not recovered, hence the clamping to zero.

use crate::{quantity::power::Watts, vehicle::VehicleParameters};

/// Combustion thermal efficiency, fixed across all powertrains.
const THERMAL_EFFICIENCY: f64 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PowerDraw {
    pub electric: Watts,
    pub combustion: Watts,
}

/// Compute the instantaneous power draw at one route sample.
///
/// `speed` and `previous_speed` are in m/s, `grade` in degrees,
/// `time_delta` in seconds (must be positive; the caller owns the
/// degenerate-timestamp fallback).
pub fn power_draw(
    speed: f64,
    grade_degrees: f64,
    previous_speed: f64,
    time_delta: f64,
    vehicle: &VehicleParameters,
) -> PowerDraw {
    let theta = grade_degrees.to_radians();

    let aerodynamic = 0.5
        * vehicle.air_density
        * vehicle.frontal_area
        * vehicle.drag_coefficient
        * speed.powi(2);
    let rolling = vehicle.gravity * vehicle.mass * vehicle.rolling_coefficient * theta.cos();
    let grade = vehicle.gravity * vehicle.mass * theta.sin();
    let inertial = vehicle.mass * (speed - previous_speed) / time_delta;

    let traction = aerodynamic + rolling + grade + inertial;
    let mechanical = traction * speed;

    let electric = mechanical * (1.0 - vehicle.hybrid_contribution) / vehicle.drivetrain_efficiency
        * vehicle.correction_factor;
    let combustion = mechanical * vehicle.hybrid_contribution / THERMAL_EFFICIENCY
        * vehicle.combustion_correction_factor;

    PowerDraw {
        electric: Watts::from(electric.max(0.0)),
        combustion: Watts::from(combustion.max(0.0)),
    }
}
