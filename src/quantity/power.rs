use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, energy::KilowattHours, time::Seconds};

/// Instantaneous power draw, SI watts.
pub type Watts = Quantity<f64, 1, 0>;

impl Watts {
    pub const fn from_kilowatts(kilowatts: f64) -> Self {
        Self(kilowatts * 1000.0)
    }
}

impl Display for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} W", self.0)
    }
}

impl Debug for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}W", self.0)
    }
}

impl Mul<Seconds> for Watts {
    type Output = KilowattHours;

    fn mul(self, rhs: Seconds) -> Self::Output {
        Quantity(self.0 * rhs.0 / 3_600_000.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_from_kilowatts() {
        assert_relative_eq!(Watts::from_kilowatts(3.5).0, 3500.0);
    }

    #[test]
    fn test_integrate_over_seconds() {
        // 1 kW over one hour is exactly 1 kWh.
        let energy = Watts::from(1000.0) * Seconds::from(3600.0);
        assert_relative_eq!(energy.0, 1.0);
    }

    #[test]
    fn test_integrate_sub_hour() {
        let energy = Watts::from(500.0) * Seconds::from(60.0);
        assert_relative_eq!(energy.0, 500.0 / 1000.0 / 60.0);
    }
}
