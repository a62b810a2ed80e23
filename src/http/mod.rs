//! HTTP API.

mod extract;
mod regions;
mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::Error;
use crate::geocoder::Geocoder;
use crate::resolve::AddressResolver;
use crate::service::{RegionService, UserService};
use crate::store::Stores;

/// Application state shared across handlers
pub struct AppState {
    pub regions: RegionService,
    pub users: UserService,
    stores: Stores,
}

impl AppState {
    pub fn new(stores: Stores, geocoder: Arc<dyn Geocoder>, geocoder_timeout: Duration) -> Self {
        let resolver = Arc::new(AddressResolver::new(
            stores.addresses.clone(),
            geocoder,
            geocoder_timeout,
        ));
        Self {
            regions: RegionService::new(stores.regions.clone()),
            users: UserService::new(stores.users.clone(), resolver),
            stores,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(regions::routes())
        .merge(users::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: bool,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.stores.health_check().await;

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        store: healthy,
    })
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidArgument(_) | Error::AddressNotFound => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Store(e) => {
                error!("Store failure: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
