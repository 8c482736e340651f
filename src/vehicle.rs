use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::SimulationError, prelude::*};

/// Powertrain variant. Selects the default parameter set once at setup;
/// the rest of the code only ever sees [`VehicleParameters`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum, Serialize, Deserialize)]
pub enum VehicleType {
    /// Fully electric powertrain.
    Electric,

    /// Combustion-assisted powertrain.
    Hybrid,
}

/// Immutable physical description of one motorcycle. Values are calibrated
/// against private telemetry upstream, so every one of them is configuration
/// rather than a constant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleParameters {
    /// Vehicle plus rider mass, kg.
    pub mass: f64,

    /// Frontal area, m².
    pub frontal_area: f64,

    /// Aerodynamic drag coefficient.
    pub drag_coefficient: f64,

    /// Rolling-resistance coefficient.
    pub rolling_coefficient: f64,

    /// Wheel radius, m.
    pub wheel_radius: f64,

    /// Battery-to-wheel efficiency of the electric drivetrain.
    pub drivetrain_efficiency: f64,

    /// Empirical correction on the electric power draw.
    pub correction_factor: f64,

    /// Empirical correction on the combustion power draw.
    pub combustion_correction_factor: f64,

    /// Ambient air density, kg/m³.
    pub air_density: f64,

    /// Gravitational acceleration, m/s².
    pub gravity: f64,

    /// Combustion share of the traction power: 0 is fully electric,
    /// 1 is fully combustion.
    pub hybrid_contribution: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            mass: 200.0,
            frontal_area: 0.6,
            drag_coefficient: 0.7,
            rolling_coefficient: 0.01,
            wheel_radius: 0.2667,
            drivetrain_efficiency: 0.85,
            correction_factor: 1.617,
            combustion_correction_factor: 1.8,
            air_density: 1.21,
            gravity: 9.8,
            hybrid_contribution: 0.0,
        }
    }
}

impl VehicleParameters {
    pub fn for_type(vehicle_type: VehicleType) -> Self {
        match vehicle_type {
            VehicleType::Electric => Self::default(),
            VehicleType::Hybrid => Self { hybrid_contribution: 1.0, ..Self::default() },
        }
    }

    /// Load overrides from a TOML file, on top of the type's defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read `{}`", path.as_ref().display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.as_ref().display()))
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let check = |ok: bool, what: &str| {
            if ok { Ok(()) } else { Err(SimulationError::InvalidConfiguration(what.to_string())) }
        };
        check(self.mass > 0.0, "vehicle mass must be positive")?;
        check(self.frontal_area > 0.0, "frontal area must be positive")?;
        check(self.wheel_radius > 0.0, "wheel radius must be positive")?;
        check(
            self.drivetrain_efficiency > 0.0 && self.drivetrain_efficiency <= 1.0,
            "drivetrain efficiency must be in (0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.hybrid_contribution),
            "hybrid contribution must be in [0, 1]",
        )?;
        check(self.air_density > 0.0, "air density must be positive")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_presets() {
        assert_relative_eq!(VehicleParameters::for_type(VehicleType::Electric).hybrid_contribution, 0.0);
        assert_relative_eq!(VehicleParameters::for_type(VehicleType::Hybrid).hybrid_contribution, 1.0);
    }

    #[test]
    fn test_validate_default_ok() {
        VehicleParameters::default().validate().unwrap();
    }

    #[test]
    fn test_validate_zero_wheel_radius() {
        let parameters = VehicleParameters { wheel_radius: 0.0, ..VehicleParameters::default() };
        assert!(matches!(
            parameters.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_bad_hybrid_contribution() {
        let parameters =
            VehicleParameters { hybrid_contribution: 1.5, ..VehicleParameters::default() };
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn test_toml_overrides() -> Result {
        let parameters: VehicleParameters = toml::from_str("mass = 180.0")?;
        assert_relative_eq!(parameters.mass, 180.0);
        assert_relative_eq!(parameters.frontal_area, 0.6);
        Ok(())
    }
}
