//! Geographic value types and their GeoJSON encoding.
//!
//! Coordinates are always stored as `(lon, lat)` in degrees, matching the
//! GeoJSON axis order used by both stores.

use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw GeoJSON geometry as it appears on the wire and in the stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Point { coordinates: [f64; 2] },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

/// Geographic point (lon/lat, degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJson", try_from = "GeoJson")]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Check that both axes are finite and inside the WGS84 ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::invalid(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::invalid(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl From<Point> for GeoJson {
    fn from(p: Point) -> Self {
        GeoJson::Point {
            coordinates: [p.lon, p.lat],
        }
    }
}

impl TryFrom<GeoJson> for Point {
    type Error = String;

    fn try_from(value: GeoJson) -> std::result::Result<Self, Self::Error> {
        match value {
            GeoJson::Point { coordinates: [lon, lat] } => Ok(Point { lon, lat }),
            other => Err(format!("expected a Point geometry, got {:?}", other)),
        }
    }
}

/// Polygon with a single outer ring.
///
/// Deserialization does not validate the ring, so a degenerate polygon read
/// back from a store is representable; it simply never intersects anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJson", try_from = "GeoJson")]
pub struct Polygon {
    ring: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from a closed ring, rejecting malformed input.
    pub fn new(ring: Vec<Point>) -> Result<Self> {
        let polygon = Self { ring };
        polygon.validate()?;
        Ok(polygon)
    }

    pub(crate) fn from_ring_unchecked(ring: Vec<Point>) -> Self {
        Self { ring }
    }

    pub fn ring(&self) -> &[Point] {
        &self.ring
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// A closed ring needs at least 3 distinct vertices plus the closing one.
    pub fn validate(&self) -> Result<()> {
        if self.ring.len() < 4 {
            return Err(Error::invalid(format!(
                "polygon ring needs at least 4 points, got {}",
                self.ring.len()
            )));
        }
        if self.ring.first() != self.ring.last() {
            return Err(Error::invalid("polygon ring is not closed"));
        }
        for point in &self.ring {
            point.validate()?;
        }
        Ok(())
    }

    /// Bounding box as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.ring.first()?;
        Some(self.ring.iter().fold(
            (first.lon, first.lat, first.lon, first.lat),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.lon), min_y.min(p.lat), max_x.max(p.lon), max_y.max(p.lat))
            },
        ))
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .ring
            .iter()
            .map(|p| Coord { x: p.lon, y: p.lat })
            .collect();
        geo::Polygon::new(LineString::new(coords), vec![])
    }
}

impl From<Polygon> for GeoJson {
    fn from(p: Polygon) -> Self {
        GeoJson::Polygon {
            coordinates: vec![p.ring.iter().map(|pt| [pt.lon, pt.lat]).collect()],
        }
    }
}

impl TryFrom<GeoJson> for Polygon {
    type Error = String;

    fn try_from(value: GeoJson) -> std::result::Result<Self, Self::Error> {
        match value {
            GeoJson::Polygon { mut coordinates } => {
                if coordinates.len() > 1 {
                    return Err("polygons with holes are not supported".to_string());
                }
                let ring = coordinates
                    .pop()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|[lon, lat]| Point { lon, lat })
                    .collect();
                Ok(Polygon { ring })
            }
            other => Err(format!("expected a Polygon geometry, got {:?}", other)),
        }
    }
}

/// Any geometry a predicate can be tested against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJson", try_from = "GeoJson")]
pub enum Shape {
    Point(Point),
    Polygon(Polygon),
}

impl Shape {
    /// Bounding box as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Shape::Point(p) => Some((p.lon, p.lat, p.lon, p.lat)),
            Shape::Polygon(poly) => poly.bbox(),
        }
    }

    /// Planar intersection test in lon/lat space.
    pub fn intersects(&self, other: &Shape) -> bool {
        use geo::Intersects;

        // Rings too short to enclose anything never match.
        for shape in [self, other] {
            if let Shape::Polygon(p) = shape {
                if p.len() < 4 {
                    return false;
                }
            }
        }

        match (self, other) {
            (Shape::Point(a), Shape::Point(b)) => a == b,
            (Shape::Point(pt), Shape::Polygon(poly)) | (Shape::Polygon(poly), Shape::Point(pt)) => {
                poly.to_geo().intersects(&pt.to_geo())
            }
            (Shape::Polygon(a), Shape::Polygon(b)) => a.to_geo().intersects(&b.to_geo()),
        }
    }
}

impl From<Point> for Shape {
    fn from(p: Point) -> Self {
        Shape::Point(p)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

impl From<Shape> for GeoJson {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(p) => p.into(),
            Shape::Polygon(p) => p.into(),
        }
    }
}

impl TryFrom<GeoJson> for Shape {
    type Error = String;

    fn try_from(value: GeoJson) -> std::result::Result<Self, Self::Error> {
        match value {
            point @ GeoJson::Point { .. } => Point::try_from(point).map(Shape::Point),
            polygon @ GeoJson::Polygon { .. } => Polygon::try_from(polygon).map(Shape::Polygon),
        }
    }
}
