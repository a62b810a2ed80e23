//! Circular buffer polygons on a spherical earth.
//!
//! The geospatial stores only answer polygon/point intersection, so a
//! "within N metres of P" query is expressed as "intersects the polygon
//! approximating the circle of radius N around P".

use crate::error::{Error, Result};
use crate::models::{Point, Polygon};

/// Mean earth radius in metres
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Angle between consecutive vertices of a buffer polygon
pub const BEARING_STEP_DEGREES: u32 = 10;

/// Vertices in every buffer polygon: 37 bearings (0..=360) plus the closing point
pub const BUFFER_POLYGON_POINTS: usize = (360 / BEARING_STEP_DEGREES) as usize + 2;

/// Approximate a circle of `radius_meters` around `center` as a closed ring.
///
/// Each vertex is the spherical direct-geodesic destination from `center`
/// along bearings 0°, 10°, ..., 360°. The first vertex is appended again at
/// the end so the ring is closed bit-for-bit, regardless of rounding at 360°.
pub fn buffer_polygon(center: Point, radius_meters: f64) -> Result<Polygon> {
    center.validate()?;
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(Error::invalid(format!(
            "radius must be a positive number of metres, got {}",
            radius_meters
        )));
    }

    let lat1 = center.lat.to_radians();
    let lon1 = center.lon.to_radians();
    let angular = radius_meters / EARTH_RADIUS_METERS;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_d, cos_d) = angular.sin_cos();

    let mut ring = Vec::with_capacity(BUFFER_POLYGON_POINTS);
    for angle in (0u32..=360).step_by(BEARING_STEP_DEGREES as usize) {
        let bearing = f64::from(angle).to_radians();

        let lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * lat2.sin());

        ring.push(Point::new(wrap_longitude(lon2.to_degrees()), lat2.to_degrees()));
    }
    ring.push(ring[0]);

    Ok(Polygon::from_ring_unchecked(ring))
}

/// Bring a longitude that stepped over the antimeridian back into [-180, 180]
fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Whether the circle around `center` reaches the North or South pole
pub fn circle_contains_pole(center: Point, radius_meters: f64) -> bool {
    (90.0 - center.lat.abs()).to_radians() * EARTH_RADIUS_METERS <= radius_meters
}

/// Whether consecutive ring vertices jump across the antimeridian
pub fn crosses_antimeridian(polygon: &Polygon) -> bool {
    polygon
        .ring()
        .windows(2)
        .any(|edge| (edge[1].lon - edge[0].lon).abs() > 180.0)
}

/// Great-circle distance in metres between two points
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}
