//! Users. A persisted user always references a resolved address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{fields as common, Document};

pub mod fields {
    pub const EMAIL: &str = "email";
    pub const ADDRESS_ID: &str = "address_id";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    /// Resolved address; never null for a persisted user
    pub address_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: String, email: String, address_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            address_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

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

    fn keyword(&self, field: &str) -> Option<String> {
        match field {
            common::ID => Some(self.id.to_string()),
            fields::EMAIL => Some(self.email.clone()),
            fields::ADDRESS_ID => Some(self.address_id.to_string()),
            common::DELETED_AT => self.deleted_at.map(|t| t.to_rfc3339()),
            _ => None,
        }
    }
}
