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

use super::extract::{JsonBody, PathParam};
use super::AppState;
use crate::error::{Error, Result};
use crate::models::{StructuredAddress, User};
use crate::resolve::Resolution;
use crate::service::{NewUser, UserUpdate};

pub(super) fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_handler).post(register_handler))
        .route(
            "/users/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    #[serde(default)]
    address: Option<StructuredAddress>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
}

#[derive(Deserialize)]
struct UpdateBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    address: Option<StructuredAddress>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
}

/// At most one way of locating the user may be given
fn location(
    address: Option<StructuredAddress>,
    coordinates: Option<Coordinates>,
) -> Result<Option<Resolution>> {
    match (address, coordinates) {
        (Some(_), Some(_)) => Err(Error::invalid(
            "provide either address or coordinates, not both",
        )),
        (Some(address), None) => Ok(Some(Resolution::ByAddress(address))),
        (None, Some(c)) => Ok(Some(Resolution::ByCoordinates {
            lat: c.latitude,
            lon: c.longitude,
        })),
        (None, None) => Ok(None),
    }
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<(StatusCode, Json<User>)> {
    let location = location(body.address, body.coordinates)?
        .ok_or_else(|| Error::invalid("either address or coordinates is required"))?;

    let user = state
        .users
        .register(NewUser {
            name: body.name,
            email: body.email,
            location,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<User>> {
    let update = UserUpdate {
        location: location(body.address, body.coordinates)?,
        name: body.name,
        email: body.email,
    };
    Ok(Json(state.users.update(id, update).await?))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
