//! Document stores.
//!
//! Every entity goes through the `Repository` trait; the backend is chosen at
//! startup. Both backends answer the same `Predicate`s, including the
//! geospatial intersection and sphere conditions.

mod document;
pub mod elasticsearch;
mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

pub use document::{fields, Document};
pub use memory::MemoryRepository;

use self::elasticsearch::{ensure_indices, EsClient, EsRepository};
use crate::config::{StoreBackend, StoreConfig};
use crate::models::{Address, Region, User};
use crate::query::Predicate;

/// Persistence contract for one document type.
///
/// Reads through `find_by_id` and `find_all` skip soft-deleted documents;
/// `find` applies exactly the conditions of the predicate it is given.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    async fn create(&self, doc: T) -> Result<T>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>>;

    async fn find_all(&self) -> Result<Vec<T>> {
        self.find(&Predicate::new().not_deleted()).await
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<T>>;

    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>> {
        Ok(self.find(predicate).await?.into_iter().next())
    }

    /// Overwrite a live document. `None` when it is missing or deleted.
    async fn replace(&self, doc: T) -> Result<Option<T>>;

    /// Set the soft-delete timestamp. `false` when already gone.
    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
}

/// The repositories of every entity, sharing one backend
#[derive(Clone)]
pub struct Stores {
    pub regions: Arc<dyn Repository<Region>>,
    pub addresses: Arc<dyn Repository<Address>>,
    pub users: Arc<dyn Repository<User>>,
    es_client: Option<EsClient>,
}

impl Stores {
    /// Fresh, empty in-process stores
    pub fn in_memory() -> Self {
        Self {
            regions: Arc::new(MemoryRepository::<Region>::new()),
            addresses: Arc::new(MemoryRepository::<Address>::new()),
            users: Arc::new(MemoryRepository::<User>::new()),
            es_client: None,
        }
    }

    /// Connect to Elasticsearch and make sure the indices exist
    pub async fn elasticsearch(es_url: &str, index_prefix: &str) -> Result<Self> {
        info!("Connecting to Elasticsearch at {}", es_url);
        let client = EsClient::new(es_url, &index_prefix.to_lowercase())?;

        if !client.health_check().await? {
            anyhow::bail!("Elasticsearch cluster is not healthy");
        }
        ensure_indices(&client).await?;

        Ok(Self {
            regions: Arc::new(EsRepository::<Region>::new(client.clone())),
            addresses: Arc::new(EsRepository::<Address>::new(client.clone())),
            users: Arc::new(EsRepository::<User>::new(client.clone())),
            es_client: Some(client),
        })
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Ok(Self::in_memory())
            }
            StoreBackend::Elasticsearch => {
                Self::elasticsearch(&config.es_url, &config.index_prefix).await
            }
        }
    }

    /// Whether the backend is reachable
    pub async fn health_check(&self) -> bool {
        match &self.es_client {
            Some(client) => client.health_check().await.unwrap_or(false),
            None => true,
        }
    }
}
