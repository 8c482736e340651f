use crate::{
    error::SimulationError,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts, time::Seconds},
};

/// State-of-charge ledger. The only way energy leaves is [`Battery::consume`]
/// and the only way it comes back is [`Battery::charge_full`], so the
/// `0 ≤ soc ≤ capacity` invariant is enforced right here.
#[derive(Debug)]
pub struct Battery {
    capacity: KilowattHours,
    soc: KilowattHours,
}

impl Battery {
    /// A full battery of the given capacity.
    pub fn try_new(capacity: KilowattHours) -> Result<Self, SimulationError> {
        if capacity <= KilowattHours::ZERO {
            return Err(SimulationError::InvalidConfiguration(format!(
                "battery capacity must be positive, got {capacity}"
            )));
        }
        Ok(Self { capacity, soc: capacity })
    }

    #[allow(dead_code)]
    pub const fn capacity(&self) -> KilowattHours {
        self.capacity
    }

    pub const fn soc(&self) -> KilowattHours {
        self.soc
    }

    /// Integrate the power draw over the time delta and subtract it from the
    /// state of charge, flooring at zero. Returns the new state of charge.
    pub fn consume(&mut self, power: Watts, time_delta: Seconds) -> KilowattHours {
        self.soc = (self.soc - power * time_delta).max(KilowattHours::ZERO);
        self.check_invariant();
        self.soc
    }

    /// True when the state of charge has dropped below the given fraction of
    /// the capacity.
    pub fn is_low(&self, threshold_fraction: f64) -> bool {
        self.soc < self.capacity * threshold_fraction
    }

    /// Refill to capacity, returning the energy delivered.
    pub fn charge_full(&mut self) -> KilowattHours {
        let delivered = self.capacity - self.soc;
        self.soc = self.capacity;
        self.check_invariant();
        delivered
    }

    /// The ledger itself can never break the bounds; tripping this means a
    /// bug, not bad input.
    fn check_invariant(&self) {
        debug_assert!(
            self.soc >= KilowattHours::ZERO && self.soc <= self.capacity,
            "state of charge {:?} escaped [0, {:?}]",
            self.soc,
            self.capacity,
        );
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_non_positive_capacity_rejected() {
        assert!(matches!(
            Battery::try_new(KilowattHours::from(0.0)),
            Err(SimulationError::InvalidConfiguration(_))
        ));
        assert!(Battery::try_new(KilowattHours::from(-1.0)).is_err());
    }

    #[test]
    fn test_consume_integrates() {
        let mut battery = Battery::try_new(KilowattHours::from(2.5)).unwrap();
        // 1 kW over 36 s is 0.01 kWh.
        let soc = battery.consume(Watts::from(1000.0), Seconds::from(36.0));
        assert_relative_eq!(soc.0, 2.49);
    }

    #[test]
    fn test_soc_floors_at_zero() {
        let mut battery = Battery::try_new(KilowattHours::from(0.1)).unwrap();
        let soc = battery.consume(Watts::from(1_000_000.0), Seconds::from(3600.0));
        assert_relative_eq!(soc.0, 0.0);
    }

    #[test]
    fn test_soc_stays_bounded_over_sequence() {
        let mut battery = Battery::try_new(KilowattHours::from(1.0)).unwrap();
        for power in [0.0, 50.0, 2000.0, 0.0, 1e9] {
            for dt in [0.0, 0.1, 1.0, 600.0] {
                let soc = battery.consume(Watts::from(power), Seconds::from(dt));
                assert!(soc >= KilowattHours::ZERO);
                assert!(soc <= battery.capacity());
            }
        }
    }

    #[test]
    fn test_is_low_threshold() {
        let mut battery = Battery::try_new(KilowattHours::from(2.0)).unwrap();
        assert!(!battery.is_low(0.5));
        battery.consume(Watts::from(1100.0), Seconds::from(3600.0)); // down to 0.9 kWh
        assert!(battery.is_low(0.5));
        assert!(!battery.is_low(0.1));
    }

    #[test]
    fn test_charge_full_returns_deficit() {
        let mut battery = Battery::try_new(KilowattHours::from(2.5)).unwrap();
        battery.consume(Watts::from(1000.0), Seconds::from(3600.0));
        let delivered = battery.charge_full();
        assert_relative_eq!(delivered.0, 1.0);
        assert_relative_eq!(battery.soc().0, 2.5);
    }

    #[test]
    fn test_charge_full_idempotent() {
        let mut battery = Battery::try_new(KilowattHours::from(2.5)).unwrap();
        battery.charge_full();
        let delivered = battery.charge_full();
        assert_relative_eq!(delivered.0, 0.0);
        assert_relative_eq!(battery.soc().0, 2.5);
    }
}
