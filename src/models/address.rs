//! Resolved addresses, persisted once per location and reused afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shape::{Point, Shape};
use crate::store::{fields as common, Document};

pub mod fields {
    pub const LOCATION: &str = "location";
    pub const STREET: &str = "street";
    pub const NUMBER: &str = "number";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const COUNTRY: &str = "country";
    pub const ZIP_CODE: &str = "zip_code";
    pub const FULL_ADDRESS: &str = "full_address";
}

/// Address cache entry. Never updated in place except for soft-delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,

    /// Comma-joined provider component names, in provider order
    pub full_address: String,

    pub location: Point,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Address {
    /// Structured fields of this record, as a caller would submit them
    pub fn structured(&self) -> StructuredAddress {
        StructuredAddress {
            street: self.street.clone(),
            number: self.number.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            zip_code: self.zip_code.clone(),
        }
    }
}

/// Structured address input for forward resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

impl StructuredAddress {
    /// Single-line query sent to the geocoding provider
    pub fn query_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}",
            self.number, self.street, self.city, self.state, self.country, self.zip_code
        )
    }

    /// `(field, value)` pairs used for the exact structural lookup
    pub fn field_values(&self) -> [(&'static str, &str); 6] {
        [
            (fields::STREET, self.street.as_str()),
            (fields::NUMBER, self.number.as_str()),
            (fields::CITY, self.city.as_str()),
            (fields::STATE, self.state.as_str()),
            (fields::COUNTRY, self.country.as_str()),
            (fields::ZIP_CODE, self.zip_code.as_str()),
        ]
    }
}

impl Document for Address {
    const COLLECTION: &'static str = "addresses";
    const SPATIAL_FIELD: Option<&'static str> = Some(fields::LOCATION);

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn shape(&self, field: &str) -> Option<Shape> {
        match field {
            fields::LOCATION => Some(Shape::Point(self.location)),
            _ => None,
        }
    }

    fn keyword(&self, field: &str) -> Option<String> {
        let value = match field {
            common::ID => self.id.to_string(),
            fields::STREET => self.street.clone(),
            fields::NUMBER => self.number.clone(),
            fields::CITY => self.city.clone(),
            fields::STATE => self.state.clone(),
            fields::COUNTRY => self.country.clone(),
            fields::ZIP_CODE => self.zip_code.clone(),
            fields::FULL_ADDRESS => self.full_address.clone(),
            common::DELETED_AT => return self.deleted_at.map(|t| t.to_rfc3339()),
            _ => return None,
        };
        Some(value)
    }
}
