use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeSeq};

use crate::prelude::*;

const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

/// A WGS-84 position in the routing providers' `[lon, lat]` ordering,
/// with the optional altitude ORS attaches when elevation is requested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub altitude: Option<f64>,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, altitude: None }
    }

    pub const fn with_altitude(lon: f64, lat: f64, altitude: f64) -> Self {
        Self { lon, lat, altitude: Some(altitude) }
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_to(self, rhs: Self) -> f64 {
        let lat_1 = self.lat.to_radians();
        let lat_2 = rhs.lat.to_radians();
        let d_lat = (rhs.lat - self.lat).to_radians();
        let d_lon = (rhs.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat_1.cos() * lat_2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METRES * a.sqrt().atan2((1.0 - a).sqrt())
    }

    pub const fn lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lon, self.lat)
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut components = s.split(',').map(str::trim).map(f64::from_str);
        let lon = components.next().context("missing longitude")??;
        let lat = components.next().context("missing latitude")??;
        let altitude = components.next().transpose()?;
        ensure!(components.next().is_none(), "too many components in `{s}`");
        Ok(Self { lon, lat, altitude })
    }
}

/// Serialized as the GeoJSON-style `[lon, lat]` (or `[lon, lat, alt]`) array.
impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(if self.altitude.is_some() { 3 } else { 2 }))?;
        seq.serialize_element(&self.lon)?;
        seq.serialize_element(&self.lat)?;
        if let Some(altitude) = self.altitude {
            seq.serialize_element(&altitude)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let components = Vec::<f64>::deserialize(deserializer)?;
        match components[..] {
            [lon, lat] => Ok(Self::new(lon, lat)),
            [lon, lat, altitude] => Ok(Self::with_altitude(lon, lat, altitude)),
            _ => Err(de::Error::invalid_length(components.len(), &"2 or 3 coordinates")),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_distance_zero() {
        let point = GeoPoint::new(-75.56359, 6.25184);
        assert_relative_eq!(point.distance_to(point), 0.0);
    }

    #[test]
    fn test_distance_known() {
        // Parque Berrío to Estadio, Medellín: roughly 2.7 km.
        let berrio = GeoPoint::new(-75.56835, 6.24731);
        let estadio = GeoPoint::new(-75.59057, 6.25679);
        let distance = berrio.distance_to(estadio);
        assert!((2600.0..2800.0).contains(&distance), "distance = {distance}");
    }

    #[test]
    fn test_distance_symmetric() {
        let a = GeoPoint::new(-75.57, 6.25);
        let b = GeoPoint::new(-75.58, 6.26);
        assert_relative_eq!(a.distance_to(b), b.distance_to(a), epsilon = 1e-9);
    }

    #[test]
    fn test_from_str() -> Result {
        let point = GeoPoint::from_str("-75.57, 6.25")?;
        assert_relative_eq!(point.lon, -75.57);
        assert_relative_eq!(point.lat, 6.25);
        assert!(point.altitude.is_none());
        Ok(())
    }

    #[test]
    fn test_deserialize_with_altitude() -> Result {
        let point: GeoPoint = serde_json::from_str("[-75.57, 6.25, 1495.0]")?;
        assert_relative_eq!(point.altitude.unwrap(), 1495.0);
        Ok(())
    }

    #[test]
    fn test_serialize_round_trip() -> Result {
        let point = GeoPoint::new(-75.57, 6.25);
        assert_eq!(serde_json::to_string(&point)?, "[-75.57,6.25]");
        Ok(())
    }
}
