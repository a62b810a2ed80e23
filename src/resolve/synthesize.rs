//! Building address records from provider results.

use chrono::Utc;
use uuid::Uuid;

use crate::geocoder::GeocodeResult;
use crate::models::{Address, Point};

/// Map a provider match onto a new, unsaved address record.
///
/// The structured fields always come from the provider's components, never
/// from the caller's input, so records seeded by coordinates and by address
/// look the same. Later components overwrite earlier ones for the same field.
pub fn address_from_result(result: &GeocodeResult) -> Address {
    let mut street = String::new();
    let mut number = String::new();
    let mut city = String::new();
    let mut state = String::new();
    let mut country = String::new();
    let mut zip_code = String::new();

    for component in &result.address_components {
        if component.has_type("street_number") {
            number = component.long_name.clone();
        }
        if component.has_type("route") {
            street = component.long_name.clone();
        }
        if component.has_type("locality") || component.has_type("administrative_area_level_2") {
            city = component.long_name.clone();
        }
        if component.has_type("administrative_area_level_1") {
            state = component.long_name.clone();
        }
        if component.has_type("country") {
            country = component.long_name.clone();
        }
        if component.has_type("postal_code") {
            zip_code = component.long_name.clone();
        }
    }

    let full_address = result
        .address_components
        .iter()
        .map(|c| c.long_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let location = result.geometry.location;
    let now = Utc::now();

    Address {
        id: Uuid::new_v4(),
        street,
        number,
        city,
        state,
        country,
        zip_code,
        full_address,
        location: Point::new(location.lng, location.lat),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
