//! Address resolution cache.
//!
//! Every lookup checks the address store first, then asks the geocoding
//! provider, then persists the provider's answer. Concurrent lookups for the
//! same key are serialized, so a location is geocoded at most once.

mod keyed;
mod synthesize;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

pub use keyed::KeyedLocks;
pub use synthesize::address_from_result;

use crate::error::{Error, Result};
use crate::geocoder::{GeocodeResult, Geocoder};
use crate::models::address::fields;
use crate::models::{Address, Point, StructuredAddress};
use crate::query::Predicate;
use crate::store::Repository;

/// Stored addresses within this distance of a query point are reused
pub const COORDINATE_TOLERANCE_METERS: f64 = 5.0;

/// How the caller identifies a location
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    ByCoordinates { lat: f64, lon: f64 },
    ByAddress(StructuredAddress),
}

pub struct AddressResolver {
    addresses: Arc<dyn Repository<Address>>,
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
    locks: KeyedLocks,
}

impl AddressResolver {
    pub fn new(
        addresses: Arc<dyn Repository<Address>>,
        geocoder: Arc<dyn Geocoder>,
        timeout: Duration,
    ) -> Self {
        Self {
            addresses,
            geocoder,
            timeout,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn resolve(&self, request: &Resolution) -> Result<Address> {
        match request {
            Resolution::ByCoordinates { lat, lon } => {
                self.address_from_coordinates(*lat, *lon).await
            }
            Resolution::ByAddress(address) => self.coordinates_from_address(address).await,
        }
    }

    /// Reverse resolution: reuse an address within the tolerance, otherwise
    /// reverse-geocode and persist.
    pub async fn address_from_coordinates(&self, lat: f64, lon: f64) -> Result<Address> {
        let point = Point::new(lon, lat);
        point.validate()?;

        let _guard = self.locks.lock(coordinate_key(point)).await;

        let nearby = Predicate::new()
            .within_sphere(fields::LOCATION, point, COORDINATE_TOLERANCE_METERS)
            .not_deleted();
        if let Some(existing) = self.addresses.find_one(&nearby).await? {
            debug!("Reusing address {} for ({}, {})", existing.id, lat, lon);
            return Ok(existing);
        }

        let result = self
            .call_provider(self.geocoder.reverse_geocode(lat, lon))
            .await?;
        self.persist(&result).await
    }

    /// Forward resolution: reuse an address with identical structured
    /// fields, otherwise forward-geocode and persist.
    pub async fn coordinates_from_address(&self, address: &StructuredAddress) -> Result<Address> {
        let _guard = self.locks.lock(address_key(address)).await;

        let same_fields = address
            .field_values()
            .into_iter()
            .fold(Predicate::new(), |p, (field, value)| p.equals(field, value))
            .not_deleted();
        if let Some(existing) = self.addresses.find_one(&same_fields).await? {
            debug!("Reusing address {} for '{}'", existing.id, address.query_line());
            return Ok(existing);
        }

        let result = self
            .call_provider(self.geocoder.forward_geocode(&address.query_line()))
            .await?;
        self.persist(&result).await
    }

    /// Bound a provider call and collapse every failure into `AddressNotFound`.
    async fn call_provider<F>(&self, call: F) -> Result<GeocodeResult>
    where
        F: Future<Output = anyhow::Result<Vec<GeocodeResult>>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(results)) => match results.into_iter().next() {
                Some(first) => Ok(first),
                None => {
                    debug!("Geocoding provider returned no results");
                    Err(Error::AddressNotFound)
                }
            },
            Ok(Err(e)) => {
                warn!("Geocoding provider failed: {:#}", e);
                Err(Error::AddressNotFound)
            }
            Err(_) => {
                warn!("Geocoding provider timed out after {:?}", self.timeout);
                Err(Error::AddressNotFound)
            }
        }
    }

    /// Store the provider's answer unless an address with the same full
    /// address already exists. Lock order is always request key, then place key.
    async fn persist(&self, result: &GeocodeResult) -> Result<Address> {
        let address = address_from_result(result);
        let _guard = self.locks.lock(place_key(&address.full_address)).await;

        let same_place = Predicate::new()
            .equals(fields::FULL_ADDRESS, address.full_address.as_str())
            .not_deleted();
        if let Some(existing) = self.addresses.find_one(&same_place).await? {
            debug!(
                "Provider answer matches stored address {} ({})",
                existing.id, existing.full_address
            );
            return Ok(existing);
        }

        let saved = self.addresses.create(address).await?;
        info!("Stored address {} ({})", saved.id, saved.full_address);
        Ok(saved)
    }
}

/// Lock key for a point, at roughly 11 m granularity
fn coordinate_key(point: Point) -> String {
    format!("coord:{:.4}:{:.4}", point.lat, point.lon)
}

fn address_key(address: &StructuredAddress) -> String {
    let parts: Vec<String> = address
        .field_values()
        .iter()
        .map(|(_, value)| value.trim().to_lowercase())
        .collect();
    format!("addr:{}", parts.join("|"))
}

fn place_key(full_address: &str) -> String {
    format!("place:{}", full_address)
}
