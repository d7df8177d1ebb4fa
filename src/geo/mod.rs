use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self { lat, lng };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Range check for values that arrived through deserialization.
    /// NaN fails both comparisons and is rejected.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinateError::LongitudeOutOfRange(self.lng));
        }
        Ok(())
    }
}

/// Great-circle distance in meters using the haversine formula.
///
/// Callers validate ranges first. The deltas are taken as absolute values so
/// that swapping the arguments yields a bit-identical result.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).abs().to_radians();
    let delta_lng = (b.lng - a.lng).abs().to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * central_angle
}

/// Point `meters` due north of `origin`. Used to build fixtures at a known
/// distance from a checkpoint.
pub fn offset_north(origin: &Coordinate, meters: f64) -> Coordinate {
    let delta_deg = (meters / EARTH_RADIUS_METERS).to_degrees();
    Coordinate {
        lat: (origin.lat + delta_deg).clamp(-90.0, 90.0),
        lng: origin.lng,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{distance_meters, offset_north, Coordinate, CoordinateError};

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate {
            lat: 53.5511,
            lng: 9.9937,
        };
        assert_eq!(distance_meters(&p, &p), 0.0);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = Coordinate {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = Coordinate {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = distance_meters(&london, &paris);
        assert!((distance - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn offset_north_lands_at_requested_distance() {
        let origin = Coordinate { lat: 0.0, lng: 0.0 };
        let moved = offset_north(&origin, 200.0);
        assert!((distance_meters(&origin, &moved) - 200.0).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = Coordinate { lat: 0.0, lng: 0.0 };
        let b = Coordinate {
            lat: 0.0,
            lng: 180.0,
        };
        let distance = distance_meters(&a, &b);
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * 6_371_000.0).abs() < 1.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(-181.0))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinate { lat, lng })
    }

    proptest! {
        /// Distance from a point to itself is exactly zero.
        #[test]
        fn identity_is_zero(a in coordinate()) {
            prop_assert_eq!(distance_meters(&a, &a), 0.0);
        }

        /// Argument order never changes the result.
        #[test]
        fn symmetric(a in coordinate(), b in coordinate()) {
            prop_assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
        }

        /// Moving further north along a meridian never decreases distance.
        #[test]
        fn monotonic_along_meridian(lng in -180.0f64..=180.0, near in 0.0f64..1_000.0, extra in 0.0f64..1_000.0) {
            let origin = Coordinate { lat: 0.0, lng };
            let d_near = distance_meters(&origin, &offset_north(&origin, near));
            let d_far = distance_meters(&origin, &offset_north(&origin, near + extra));
            prop_assert!(d_far >= d_near);
        }
    }
}
