use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Elapsed time, SI seconds.
pub type Seconds = Quantity<f64, 0, 1>;

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} s", self.0)
    }
}

impl Debug for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.0)
    }
}
