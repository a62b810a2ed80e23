//! In-process document store.
//!
//! Documents live in a hash map; the envelopes of their spatial field are
//! kept in an R-tree so intersection predicates only test exact geometry
//! against candidates whose bounding boxes overlap the query shape.

use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;
use uuid::Uuid;

use super::{Document, Repository};
use crate::query::Predicate;

/// R-tree entry pointing back at a stored document
#[derive(Clone, PartialEq)]
struct IndexedDocument {
    id: Uuid,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedDocument {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedDocument {
    fn new<T: Document>(doc: &T) -> Option<Self> {
        let field = T::SPATIAL_FIELD?;
        let (min_x, min_y, max_x, max_y) = doc.shape(field)?.bbox()?;
        Some(Self {
            id: doc.id(),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

struct Collection<T> {
    docs: HashMap<Uuid, T>,
    tree: RTree<IndexedDocument>,
}

impl<T: Document> Collection<T> {
    fn insert(&mut self, doc: T) {
        if let Some(old) = self.docs.get(&doc.id()) {
            if let Some(indexed) = IndexedDocument::new(old) {
                self.tree.remove(&indexed);
            }
        }
        if let Some(indexed) = IndexedDocument::new(&doc) {
            self.tree.insert(indexed);
        }
        self.docs.insert(doc.id(), doc);
    }

    fn live(&self, id: &Uuid) -> Option<&T> {
        self.docs.get(id).filter(|d| d.deleted_at().is_none())
    }

    fn find(&self, predicate: &Predicate) -> Vec<T> {
        let candidates: Vec<&T> = match predicate.spatial_filter() {
            Some((field, shape)) if Some(field) == T::SPATIAL_FIELD => match shape.bbox() {
                Some((min_x, min_y, max_x, max_y)) => {
                    let query = AABB::from_corners([min_x, min_y], [max_x, max_y]);
                    self.tree
                        .locate_in_envelope_intersecting(&query)
                        .filter_map(|indexed| self.docs.get(&indexed.id))
                        .collect()
                }
                None => Vec::new(),
            },
            _ => self.docs.values().collect(),
        };

        let mut matched: Vec<T> = candidates
            .into_iter()
            .filter(|doc| predicate.matches(*doc))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id())));
        matched
    }
}

/// Repository backed by process memory
pub struct MemoryRepository<T> {
    inner: RwLock<Collection<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collection {
                docs: HashMap::new(),
                tree: RTree::new(),
            }),
            _marker: PhantomData,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collection<T>>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("{} collection lock poisoned", T::COLLECTION))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collection<T>>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("{} collection lock poisoned", T::COLLECTION))
    }
}

impl<T: Document> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn create(&self, doc: T) -> Result<T> {
        let mut collection = self.write()?;
        if collection.docs.contains_key(&doc.id()) {
            bail!("{} {} already exists", T::COLLECTION, doc.id());
        }
        collection.insert(doc.clone());
        debug!("Stored {} {}", T::COLLECTION, doc.id());
        Ok(doc)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.read()?.live(&id).cloned())
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<T>> {
        Ok(self.read()?.find(predicate))
    }

    async fn replace(&self, mut doc: T) -> Result<Option<T>> {
        let mut collection = self.write()?;
        if collection.live(&doc.id()).is_none() {
            return Ok(None);
        }
        doc.touch(Utc::now());
        collection.insert(doc.clone());
        Ok(Some(doc))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let mut collection = self.write()?;
        let Some(mut doc) = collection.live(&id).cloned() else {
            return Ok(false);
        };
        doc.mark_deleted(Utc::now());
        collection.insert(doc);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewRegion, Point, Polygon, Region};
    use crate::query::{containing_point, near_point};

    fn square(center: Point, half: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(center.lon - half, center.lat - half),
            Point::new(center.lon + half, center.lat - half),
            Point::new(center.lon + half, center.lat + half),
            Point::new(center.lon - half, center.lat + half),
            Point::new(center.lon - half, center.lat - half),
        ])
        .unwrap()
    }

    fn region(owner: Uuid, location: Polygon) -> Region {
        Region::new(NewRegion {
            user_id: owner,
            name: "test".to_string(),
            observation: None,
            location,
        })
    }

    #[tokio::test]
    async fn test_containing_point_square() {
        let repo = MemoryRepository::<Region>::new();
        let stored = repo
            .create(region(Uuid::new_v4(), square(Point::new(0.0, 0.0), 1.0)))
            .await
            .unwrap();

        let hits = repo
            .find(&containing_point(Point::new(0.0, 0.0)).unwrap())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, stored.id);

        let misses = repo
            .find(&containing_point(Point::new(10.0, 10.0)).unwrap())
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_near_point_never_returns_excluded_owner() {
        let repo = MemoryRepository::<Region>::new();
        let excluded = Uuid::new_v4();
        let other = Uuid::new_v4();
        let center = Point::new(-46.64, -23.56);

        repo.create(region(excluded, square(center, 0.01))).await.unwrap();
        let kept = repo.create(region(other, square(center, 0.01))).await.unwrap();

        let hits = repo
            .find(&near_point(center, 5000.0, excluded).unwrap())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, kept.id);
        assert!(hits.iter().all(|r| r.user_id != excluded));
    }

    #[tokio::test]
    async fn test_soft_deleted_regions_are_hidden() {
        let repo = MemoryRepository::<Region>::new();
        let stored = repo
            .create(region(Uuid::new_v4(), square(Point::new(0.0, 0.0), 1.0)))
            .await
            .unwrap();

        assert!(repo.soft_delete(stored.id).await.unwrap());
        assert!(!repo.soft_delete(stored.id).await.unwrap());
        assert!(repo.find_by_id(stored.id).await.unwrap().is_none());
        assert!(repo.find_all().await.unwrap().is_empty());
        assert!(repo
            .find(&containing_point(Point::new(0.0, 0.0)).unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_degenerate_polygon_does_not_break_queries() {
        let repo = MemoryRepository::<Region>::new();
        let mut broken = region(Uuid::new_v4(), square(Point::new(0.0, 0.0), 1.0));
        broken.location = Polygon::from_ring_unchecked(vec![]);
        repo.create(broken).await.unwrap();

        let mut sliver = region(Uuid::new_v4(), square(Point::new(0.0, 0.0), 1.0));
        sliver.location = Polygon::from_ring_unchecked(vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)]);
        repo.create(sliver).await.unwrap();

        let hits = repo
            .find(&near_point(Point::new(0.0, 0.0), 1000.0, Uuid::new_v4()).unwrap())
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_replace_moves_spatial_index_entry() {
        let repo = MemoryRepository::<Region>::new();
        let mut stored = repo
            .create(region(Uuid::new_v4(), square(Point::new(0.0, 0.0), 1.0)))
            .await
            .unwrap();

        stored.location = square(Point::new(20.0, 20.0), 1.0);
        assert!(repo.replace(stored.clone()).await.unwrap().is_some());

        assert!(repo
            .find(&containing_point(Point::new(0.0, 0.0)).unwrap())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            repo.find(&containing_point(Point::new(20.0, 20.0)).unwrap())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_list() {
        let repo = MemoryRepository::<Region>::new();
        let hits = repo
            .find(&containing_point(Point::new(0.0, 0.0)).unwrap())
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
