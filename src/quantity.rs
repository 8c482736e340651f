pub mod energy;
pub mod power;
pub mod time;

use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

/// Dimensioned scalar. `POWER` and `TIME` are the exponents of the two base
/// dimensions this crate cares about; the scale (watts vs kilowatt-hours) is
/// carried by the concrete alias, and every cross-scale conversion is a
/// dedicated `impl` in the alias's module.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Quantity<T, const POWER: isize, const TIME: isize>(pub T);

impl<T, const POWER: isize, const TIME: isize> Quantity<T, POWER, TIME>
where
    Self: PartialOrd,
{
    pub fn min(mut self, rhs: Self) -> Self {
        if rhs < self {
            self = rhs;
        }
        self
    }

    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }

    pub fn clamp(mut self, min: Self, max: Self) -> Self {
        if self < min {
            self = min;
        }
        if self > max {
            self = max;
        }
        self
    }
}

impl<const POWER: isize, const TIME: isize> Quantity<f64, POWER, TIME> {
    pub const ZERO: Self = Self(0.0);
}

impl<T, const POWER: isize, const TIME: isize> Mul<T> for Quantity<T, POWER, TIME>
where
    T: Mul<T>,
{
    type Output = Quantity<T::Output, POWER, TIME>;

    fn mul(self, rhs: T) -> Self::Output {
        Quantity(self.0 * rhs)
    }
}

impl<T, const POWER: isize, const TIME: isize> Div<T> for Quantity<T, POWER, TIME>
where
    T: Div<T>,
{
    type Output = Quantity<T::Output, POWER, TIME>;

    fn div(self, rhs: T) -> Self::Output {
        Quantity(self.0 / rhs)
    }
}
