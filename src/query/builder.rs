//! Region query construction.

use tracing::debug;
use uuid::Uuid;

use super::Predicate;
use crate::error::{Error, Result};
use crate::geometry::{buffer_polygon, circle_contains_pole, crosses_antimeridian};
use crate::models::region::fields;
use crate::models::Point;

/// Regions whose polygon contains or touches `point`, across all owners.
pub fn containing_point(point: Point) -> Result<Predicate> {
    point.validate()?;

    Ok(Predicate::new()
        .intersects(fields::LOCATION, point)
        .not_deleted())
}

/// Regions intersecting the circle of `max_distance_meters` around `point`,
/// excluding every region owned by `exclude_user_id`.
///
/// Circles that wrap around a pole or across the antimeridian have no
/// single lon/lat ring and are rejected.
pub fn near_point(point: Point, max_distance_meters: f64, exclude_user_id: Uuid) -> Result<Predicate> {
    let buffer = buffer_polygon(point, max_distance_meters)?;
    if circle_contains_pole(point, max_distance_meters) {
        return Err(Error::invalid("search circle must not contain a pole"));
    }
    if crosses_antimeridian(&buffer) {
        return Err(Error::invalid("search circle must not cross the antimeridian"));
    }

    debug!(
        "Near-point query at ({}, {}) radius {}m excluding {}",
        point.lon, point.lat, max_distance_meters, exclude_user_id
    );

    Ok(Predicate::new()
        .intersects(fields::LOCATION, buffer)
        .not_deleted()
        .not_equals(fields::USER_ID, exclude_user_id.to_string()))
}
