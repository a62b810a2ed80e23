//! User-owned polygonal regions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shape::{Polygon, Shape};
use crate::store::{fields as common, Document};

pub mod fields {
    pub const LOCATION: &str = "location";
    pub const USER_ID: &str = "user_id";
    pub const NAME: &str = "name";
}

/// A polygon registered by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    pub location: Polygon,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; regions are never physically removed
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Caller-supplied content of a region, used for both create and replace
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegion {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub observation: Option<String>,
    pub location: Polygon,
}

impl Region {
    pub fn new(data: NewRegion) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            observation: data.observation,
            location: data.location,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Replace the mutable content, keeping identity and creation time
    pub fn replace_with(&mut self, data: NewRegion) {
        self.user_id = data.user_id;
        self.name = data.name;
        self.observation = data.observation;
        self.location = data.location;
    }
}

impl Document for Region {
    const COLLECTION: &'static str = "regions";
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
            fields::LOCATION => Some(Shape::Polygon(self.location.clone())),
            _ => None,
        }
    }

    fn keyword(&self, field: &str) -> Option<String> {
        match field {
            common::ID => Some(self.id.to_string()),
            fields::USER_ID => Some(self.user_id.to_string()),
            fields::NAME => Some(self.name.clone()),
            common::DELETED_AT => self.deleted_at.map(|t| t.to_rfc3339()),
            _ => None,
        }
    }
}
