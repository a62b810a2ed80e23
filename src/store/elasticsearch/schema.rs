//! Elasticsearch index schema management.

use anyhow::{Context, Result};
use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use tracing::info;

use super::EsClient;
use crate::models::{Address, Region, User};
use crate::store::Document;

/// Mappings embedded at compile time
const REGIONS_MAPPING: &str = include_str!("../../../schema/regions_mapping.json");
const ADDRESSES_MAPPING: &str = include_str!("../../../schema/addresses_mapping.json");
const USERS_MAPPING: &str = include_str!("../../../schema/users_mapping.json");

/// Mapping document for a collection
pub fn mapping_for(collection: &str) -> Result<serde_json::Value> {
    let raw = if collection == Region::COLLECTION {
        REGIONS_MAPPING
    } else if collection == Address::COLLECTION {
        ADDRESSES_MAPPING
    } else if collection == User::COLLECTION {
        USERS_MAPPING
    } else {
        anyhow::bail!("No mapping for collection {}", collection);
    };
    serde_json::from_str(raw).with_context(|| format!("Failed to parse {} mapping", collection))
}

/// Create the index for `T` if it does not exist yet
pub async fn ensure_index<T: Document>(client: &EsClient) -> Result<()> {
    let es = client.client();
    let index_name = client.index_for::<T>();

    let exists = es
        .indices()
        .exists(IndicesExistsParts::Index(&[&index_name]))
        .send()
        .await?
        .status_code()
        .is_success();

    if exists {
        info!("Index {} already exists, skipping creation", index_name);
        return Ok(());
    }

    let mapping = mapping_for(T::COLLECTION)?;

    info!("Creating index: {}", index_name);
    let response = es
        .indices()
        .create(IndicesCreateParts::Index(&index_name))
        .body(mapping)
        .send()
        .await
        .context("Failed to create index")?;

    if !response.status_code().is_success() {
        let error_body = response.text().await?;
        anyhow::bail!("Failed to create index {}: {}", index_name, error_body);
    }

    info!("Index {} created successfully", index_name);
    Ok(())
}

/// Create every index the service needs
pub async fn ensure_indices(client: &EsClient) -> Result<()> {
    futures::try_join!(
        ensure_index::<Region>(client),
        ensure_index::<Address>(client),
        ensure_index::<User>(client),
    )?;
    Ok(())
}
