//! Fixtures shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::geocoder::{AddressComponent, GeocodeGeometry, GeocodeResult, Geocoder, LatLng};

fn component(name: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        long_name: name.to_string(),
        short_name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

/// Provider answer for Avenida Paulista 1578, São Paulo
pub fn paulista_result() -> GeocodeResult {
    GeocodeResult {
        address_components: vec![
            component("1578", &["street_number"]),
            component("Avenida Paulista", &["route"]),
            component("Bela Vista", &["sublocality", "political"]),
            component("São Paulo", &["administrative_area_level_2", "political"]),
            component("SP", &["administrative_area_level_1", "political"]),
            component("Brazil", &["country", "political"]),
            component("01310-200", &["postal_code"]),
        ],
        formatted_address: None,
        geometry: GeocodeGeometry {
            location: LatLng {
                lat: -23.5613,
                lng: -46.6565,
            },
        },
    }
}

enum Reply {
    Results(Vec<GeocodeResult>),
    Fail,
}

/// Canned geocoder counting its calls
pub struct StubGeocoder {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl StubGeocoder {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn returning(result: GeocodeResult) -> Self {
        Self::with_reply(Reply::Results(vec![result]))
    }

    pub fn empty() -> Self {
        Self::with_reply(Reply::Results(Vec::new()))
    }

    pub fn failing() -> Self {
        Self::with_reply(Reply::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }

    async fn answer(&self, query: String) -> Result<Vec<GeocodeResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Reply::Results(results) => Ok(results.clone()),
            Reply::Fail => anyhow::bail!("provider unavailable"),
        }
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Vec<GeocodeResult>> {
        self.answer(format!("{},{}", lat, lon)).await
    }

    async fn forward_geocode(&self, address_line: &str) -> Result<Vec<GeocodeResult>> {
        self.answer(address_line.to_string()).await
    }
}
