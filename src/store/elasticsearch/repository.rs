//! Document repository over one Elasticsearch index.

use std::marker::PhantomData;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use elasticsearch::params::Refresh;
use elasticsearch::{GetParts, IndexParts, SearchParts};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::{query::to_query, EsClient};
use crate::query::Predicate;
use crate::store::{Document, Repository};

/// Upper bound on hits returned by a single predicate search
const MAX_HITS: usize = 10_000;

pub struct EsRepository<T> {
    client: EsClient,
    index_name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> EsRepository<T> {
    pub fn new(client: EsClient) -> Self {
        let index_name = client.index_for::<T>();
        Self {
            client,
            index_name,
            _marker: PhantomData,
        }
    }

    /// Write a document, waiting until it is visible to searches
    async fn put(&self, doc: &T) -> Result<()> {
        let id = doc.id().to_string();
        let response = self
            .client
            .client()
            .index(IndexParts::IndexId(&self.index_name, &id))
            .refresh(Refresh::WaitFor)
            .body(doc)
            .send()
            .await
            .with_context(|| format!("Index request for {} {} failed", T::COLLECTION, id))?;

        if !response.status_code().is_success() {
            let error_body = response.text().await?;
            anyhow::bail!("Failed to store {} {}: {}", T::COLLECTION, id, error_body);
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Document> Repository<T> for EsRepository<T> {
    async fn create(&self, doc: T) -> Result<T> {
        self.put(&doc).await?;
        debug!("Stored {} {}", T::COLLECTION, doc.id());
        Ok(doc)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>> {
        let id = id.to_string();
        let response = self
            .client
            .client()
            .get(GetParts::IndexId(&self.index_name, &id))
            .send()
            .await
            .with_context(|| format!("Get request for {} {} failed", T::COLLECTION, id))?;

        if response.status_code().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status_code().is_success() {
            let error_body = response.text().await?;
            anyhow::bail!("Failed to load {} {}: {}", T::COLLECTION, id, error_body);
        }

        let body = response.json::<serde_json::Value>().await?;
        let doc: T = serde_json::from_value(body["_source"].clone())
            .with_context(|| format!("Malformed {} document {}", T::COLLECTION, id))?;

        Ok(doc.deleted_at().is_none().then_some(doc))
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<T>> {
        let body = json!({
            "query": to_query(predicate),
            "size": MAX_HITS,
            "sort": [{ "created_at": "asc" }, { "id": "asc" }]
        });

        debug!("{} query: {}", T::COLLECTION, body);

        let response = self
            .client
            .client()
            .search(SearchParts::Index(&[&self.index_name]))
            .body(body)
            .send()
            .await
            .with_context(|| format!("Search on {} failed", self.index_name))?;

        if !response.status_code().is_success() {
            let error_body = response.text().await?;
            anyhow::bail!("Search on {} failed: {}", self.index_name, error_body);
        }

        let response_body = response.json::<serde_json::Value>().await?;
        let hits = response_body["hits"]["hits"]
            .as_array()
            .map(|a| a.to_vec())
            .unwrap_or_default();

        hits.into_iter()
            .map(|mut hit| {
                serde_json::from_value(hit["_source"].take())
                    .with_context(|| format!("Malformed {} document in search hit", T::COLLECTION))
            })
            .collect()
    }

    async fn replace(&self, mut doc: T) -> Result<Option<T>> {
        if self.find_by_id(doc.id()).await?.is_none() {
            return Ok(None);
        }
        doc.touch(Utc::now());
        self.put(&doc).await?;
        Ok(Some(doc))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let Some(mut doc) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        doc.mark_deleted(Utc::now());
        self.put(&doc).await?;
        Ok(true)
    }
}
