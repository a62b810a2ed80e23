//! Elasticsearch-backed document store.

mod client;
mod query;
mod repository;
mod schema;

pub use client::EsClient;
pub use query::to_query;
pub use repository::EsRepository;
pub use schema::{ensure_index, ensure_indices, mapping_for};
