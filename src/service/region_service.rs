//! Region lifecycle and geospatial lookups.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewRegion, Point, Region};
use crate::query;
use crate::store::Repository;

const ENTITY: &str = "Region";

pub struct RegionService {
    regions: Arc<dyn Repository<Region>>,
}

impl RegionService {
    pub fn new(regions: Arc<dyn Repository<Region>>) -> Self {
        Self { regions }
    }

    pub async fn create(&self, data: NewRegion) -> Result<Region> {
        data.location.validate()?;
        let region = self.regions.create(Region::new(data)).await?;
        info!("Created region {} for user {}", region.id, region.user_id);
        Ok(region)
    }

    /// Replace the content of a live region
    pub async fn update(&self, id: Uuid, data: NewRegion) -> Result<Region> {
        data.location.validate()?;
        let mut region = self.get(id).await?;
        region.replace_with(data);
        self.regions
            .replace(region)
            .await?
            .ok_or(Error::NotFound { entity: ENTITY, id })
    }

    pub async fn list(&self) -> Result<Vec<Region>> {
        Ok(self.regions.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Region> {
        self.regions
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound { entity: ENTITY, id })
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.regions.soft_delete(id).await? {
            info!("Deleted region {}", id);
            Ok(())
        } else {
            Err(Error::NotFound { entity: ENTITY, id })
        }
    }

    /// Live regions of any owner whose polygon covers `point`
    pub async fn containing_point(&self, point: Point) -> Result<Vec<Region>> {
        let predicate = query::containing_point(point)?;
        let regions = self.regions.find(&predicate).await?;
        debug!("{} regions contain ({}, {})", regions.len(), point.lon, point.lat);
        Ok(regions)
    }

    /// Live regions of other owners within `max_distance_meters` of `point`
    pub async fn near_point(
        &self,
        point: Point,
        max_distance_meters: f64,
        exclude_user_id: Uuid,
    ) -> Result<Vec<Region>> {
        let predicate = query::near_point(point, max_distance_meters, exclude_user_id)?;
        let regions = self.regions.find(&predicate).await?;
        debug!(
            "{} regions within {}m of ({}, {})",
            regions.len(),
            max_distance_meters,
            point.lon,
            point.lat
        );
        Ok(regions)
    }
}
