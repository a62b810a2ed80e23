//! Spherical geometry helpers.

mod buffer;

pub use buffer::{
    buffer_polygon, circle_contains_pole, crosses_antimeridian, haversine_distance,
    BEARING_STEP_DEGREES, BUFFER_POLYGON_POINTS, EARTH_RADIUS_METERS,
};
