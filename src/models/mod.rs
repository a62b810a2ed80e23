//! Core data models.

pub mod address;
pub mod shape;
pub mod region;
pub mod user;

pub use address::{Address, StructuredAddress};
pub use shape::{GeoJson, Point, Polygon, Shape};
pub use region::{NewRegion, Region};
pub use user::User;
