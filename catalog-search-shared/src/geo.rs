//! Geographic primitives.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A query center plus an inclusive radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRadius {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl GeoRadius {
    /// Whether `point` lies within the radius (boundary included).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        haversine_km(&self.center, point) <= self.radius_km
    }
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let p = GeoPoint::new(38.4237, 27.1428);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_izmir_istanbul() {
        let izmir = GeoPoint::new(38.4237, 27.1428);
        let istanbul = GeoPoint::new(41.0082, 28.9784);
        let d = haversine_km(&izmir, &istanbul);
        assert!((d - 328.0).abs() < 5.0, "distance was {}", d);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let center = GeoPoint::new(38.4237, 27.1428);
        let point = GeoPoint::new(38.50, 27.20);
        let exact = haversine_km(&center, &point);

        let at_boundary = GeoRadius { center, radius_km: exact };
        assert!(at_boundary.contains(&point));

        let just_inside = GeoRadius { center, radius_km: exact - 1e-9 };
        assert!(!just_inside.contains(&point));
    }
}
