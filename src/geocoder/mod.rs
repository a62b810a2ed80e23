//! External geocoding provider.
//!
//! The resolver treats the provider as a black box returning structured
//! results; any error, including "no results", means resolution failed.

mod google;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use google::GoogleGeocoder;

/// One named address component with its type tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeGeometry {
    pub location: LatLng,
}

/// A single provider match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub address_components: Vec<AddressComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    pub geometry: GeocodeGeometry,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates → address matches, best first
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Vec<GeocodeResult>>;

    /// Single-line address → matches, best first
    async fn forward_geocode(&self, address_line: &str) -> Result<Vec<GeocodeResult>>;
}
