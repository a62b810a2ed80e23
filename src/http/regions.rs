use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::AppState;
use crate::error::Result;
use crate::models::{NewRegion, Point, Region};

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/regions", get(list_handler).post(create_handler))
        .route("/regions/containing-point", get(containing_point_handler))
        .route("/regions/near-point", get(near_point_handler))
        .route(
            "/regions/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Deserialize)]
struct ContainingPointParams {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearPointParams {
    latitude: f64,
    longitude: f64,
    max_distance: f64,
    exclude_user_id: Uuid,
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewRegion>,
) -> Result<(StatusCode, Json<Region>)> {
    let region = state.regions.create(body).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

async fn list_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Region>>> {
    Ok(Json(state.regions.list().await?))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Region>> {
    Ok(Json(state.regions.get(id).await?))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<NewRegion>,
) -> Result<Json<Region>> {
    Ok(Json(state.regions.update(id, body).await?))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode> {
    state.regions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn containing_point_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ContainingPointParams>,
) -> Result<Json<Vec<Region>>> {
    let point = Point::new(params.longitude, params.latitude);
    Ok(Json(state.regions.containing_point(point).await?))
}

async fn near_point_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<NearPointParams>,
) -> Result<Json<Vec<Region>>> {
    let point = Point::new(params.longitude, params.latitude);
    let regions = state
        .regions
        .near_point(point, params.max_distance, params.exclude_user_id)
        .await?;
    Ok(Json(regions))
}
