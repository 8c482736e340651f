use std::{
    fmt::{Debug, Display, Formatter},
    ops::Div,
};

use crate::quantity::{Quantity, power::Watts, time::Seconds};

/// Battery-scale energy. The routing and dynamics code works in SI watts and
/// seconds; energy crosses into kilowatt-hours only through the conversions
/// defined here and in [`crate::quantity::power`].
pub type KilowattHours = Quantity<f64, 1, 1>;

impl KilowattHours {
    #[allow(dead_code)]
    pub const fn from_watt_hours(watt_hours: f64) -> Self {
        Self(watt_hours * 0.001)
    }
}

impl Default for KilowattHours {
    fn default() -> Self {
        Self(0.0)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}Wh", self.0 * 1000.0)
    }
}

impl Div<Watts> for KilowattHours {
    type Output = Seconds;

    fn div(self, rhs: Watts) -> Self::Output {
        Quantity(self.0 * 3_600_000.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_from_watt_hours() {
        assert_relative_eq!(KilowattHours::from_watt_hours(700.0).0, 0.7);
    }

    #[test]
    fn test_charge_time() {
        // Refilling 1.75 kWh at 3.5 kW takes half an hour.
        let time = KilowattHours::from(1.75) / Watts::from_kilowatts(3.5);
        assert_relative_eq!(time.0, 1800.0);
    }
}
