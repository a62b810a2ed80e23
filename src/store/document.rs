//! The contract between persisted entities and the stores.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::models::Shape;

/// Field names shared by every document type.
pub mod fields {
    pub const ID: &str = "id";
    pub const DELETED_AT: &str = "deleted_at";
}

/// A soft-deletable entity the stores can index and filter.
///
/// Predicates address fields by name; `shape` and `keyword` expose those
/// fields to the in-memory store without a round-trip through JSON.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also the suffix of the Elasticsearch index
    const COLLECTION: &'static str;

    /// Field indexed in the R-tree / mapped as a geo type, if any
    const SPATIAL_FIELD: Option<&'static str> = None;

    fn id(&self) -> Uuid;

    /// Listing order
    fn created_at(&self) -> DateTime<Utc>;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn mark_deleted(&mut self, at: DateTime<Utc>);

    /// Refresh the update timestamp before a replace
    fn touch(&mut self, at: DateTime<Utc>);

    /// Geometry stored under `field`
    fn shape(&self, _field: &str) -> Option<Shape> {
        None
    }

    /// Exact-match value stored under `field`
    fn keyword(&self, field: &str) -> Option<String>;
}
