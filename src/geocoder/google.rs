//! Google Maps Geocoding API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{GeocodeResult, Geocoder};
use crate::config::GeocoderConfig;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GeocodeResponse {
    /// `OK` carries results, `ZERO_RESULTS` is an empty match, anything else fails
    fn into_results(self) -> Result<Vec<GeocodeResult>> {
        match self.status.as_str() {
            "OK" => Ok(self.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => anyhow::bail!(
                "Geocoding provider returned {}: {}",
                status,
                self.error_message.unwrap_or_default()
            ),
        }
    }
}

pub struct GoogleGeocoder {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url).context("Invalid geocoder base URL")?,
            api_key: config.api_key.clone(),
        })
    }

    async fn request(&self, param: &str, value: &str) -> Result<Vec<GeocodeResult>> {
        debug!("Geocoding request {}={}", param, value);

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(param, value)
            .append_pair("key", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Geocoding request failed")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Geocoding request failed with status {}: {:?}",
                response.status(),
                response.text().await.ok()
            );
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        body.into_results()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Vec<GeocodeResult>> {
        self.request("latlng", &format!("{},{}", lat, lon)).await
    }

    async fn forward_geocode(&self, address_line: &str) -> Result<Vec<GeocodeResult>> {
        self.request("address", address_line).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "results": [{
            "address_components": [
                {"long_name": "1578", "short_name": "1578", "types": ["street_number"]},
                {"long_name": "Avenida Paulista", "short_name": "Av. Paulista", "types": ["route"]},
                {"long_name": "Bela Vista", "short_name": "Bela Vista", "types": ["political", "sublocality", "sublocality_level_1"]},
                {"long_name": "São Paulo", "short_name": "São Paulo", "types": ["administrative_area_level_2", "political"]},
                {"long_name": "São Paulo", "short_name": "SP", "types": ["administrative_area_level_1", "political"]},
                {"long_name": "Brazil", "short_name": "BR", "types": ["country", "political"]},
                {"long_name": "01310-200", "short_name": "01310-200", "types": ["postal_code"]}
            ],
            "formatted_address": "Av. Paulista, 1578 - Bela Vista, São Paulo - SP, 01310-200, Brazil",
            "geometry": {
                "location": {"lat": -23.5613, "lng": -46.6565},
                "location_type": "ROOFTOP",
                "viewport": {
                    "northeast": {"lat": -23.56, "lng": -46.655},
                    "southwest": {"lat": -23.563, "lng": -46.658}
                }
            },
            "place_id": "ChIJ",
            "types": ["street_address"]
        }],
        "status": "OK"
    }"#;

    #[test]
    fn test_parse_ok_response() {
        let response: GeocodeResponse = serde_json::from_str(SAMPLE).unwrap();
        let results = response.into_results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].address_components.len(), 7);
        assert!(results[0].address_components[1].has_type("route"));
        assert_eq!(results[0].geometry.location.lng, -46.6565);
    }

    #[test]
    fn test_zero_results_is_empty() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(response.into_results().unwrap().is_empty());
    }

    #[test]
    fn test_denied_is_error() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap();
        let err = response.into_results().unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(GoogleGeocoder::new(&GeocoderConfig::default()).is_ok());
    }
}
