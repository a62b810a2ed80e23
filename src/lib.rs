//! Georegions - geofence regions backend
//!
//! Users register polygonal regions and are located by a resolved address.
//! Regions are queried by point containment or by proximity, and addresses
//! are resolved through an external geocoder and cached in the store.

pub mod config;
pub mod error;
pub mod geocoder;
pub mod geometry;
pub mod http;
pub mod models;
pub mod query;
pub mod resolve;
pub mod service;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use models::{Address, Point, Polygon, Region, StructuredAddress, User};
