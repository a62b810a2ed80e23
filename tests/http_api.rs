use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use georegions::geocoder::{AddressComponent, GeocodeGeometry, GeocodeResult, Geocoder, LatLng};
use georegions::http::{router, AppState};
use georegions::store::Stores;

/// Always answers with the same São Paulo address
#[derive(Default)]
struct FixedGeocoder {
    calls: AtomicUsize,
}

impl FixedGeocoder {
    fn result() -> GeocodeResult {
        let component = |name: &str, kind: &str| AddressComponent {
            long_name: name.to_string(),
            short_name: name.to_string(),
            types: vec![kind.to_string()],
        };
        GeocodeResult {
            address_components: vec![
                component("1578", "street_number"),
                component("Avenida Paulista", "route"),
                component("São Paulo", "administrative_area_level_2"),
                component("SP", "administrative_area_level_1"),
                component("Brazil", "country"),
                component("01310-200", "postal_code"),
            ],
            formatted_address: None,
            geometry: GeocodeGeometry {
                location: LatLng {
                    lat: -23.5613,
                    lng: -46.6565,
                },
            },
        }
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn reverse_geocode(&self, _lat: f64, _lon: f64) -> anyhow::Result<Vec<GeocodeResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Self::result()])
    }

    async fn forward_geocode(&self, _address_line: &str) -> anyhow::Result<Vec<GeocodeResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Self::result()])
    }
}

fn app() -> (Router, Arc<FixedGeocoder>) {
    let geocoder = Arc::new(FixedGeocoder::default());
    let state = AppState::new(Stores::in_memory(), geocoder.clone(), Duration::from_secs(1));
    (router(Arc::new(state)), geocoder)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn square(min: f64, max: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
    })
}

async fn register(app: &Router, email: &str) -> Value {
    let (status, user) = send(
        app,
        "POST",
        "/users",
        Some(json!({
            "name": "Maria",
            "email": email,
            "coordinates": {"latitude": -23.5613, "longitude": -46.6565}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn region_lifecycle() {
    let (app, _) = app();
    let user = register(&app, "owner@example.com").await;

    let (status, region) = send(
        &app,
        "POST",
        "/regions",
        Some(json!({
            "user_id": user["id"],
            "name": "block",
            "location": square(-1.0, 1.0)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = region["id"].as_str().unwrap().to_string();

    let (status, hits) = send(
        &app,
        "GET",
        "/regions/containing-point?latitude=0&longitude=0",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/regions/{}", id),
        Some(json!({
            "user_id": user["id"],
            "name": "moved",
            "location": square(5.0, 6.0)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, hits) = send(
        &app,
        "GET",
        "/regions/containing-point?latitude=0&longitude=0",
        None,
    )
    .await;
    assert!(hits.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &format!("/regions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/regions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn near_point_excludes_owner() {
    let (app, _) = app();
    let owner = register(&app, "owner@example.com").await;
    let other = register(&app, "other@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/regions",
        Some(json!({
            "user_id": owner["id"],
            "name": "paulista",
            "location": {
                "type": "Polygon",
                "coordinates": [[
                    [-46.66, -23.57], [-46.64, -23.57], [-46.64, -23.55],
                    [-46.66, -23.55], [-46.66, -23.57]
                ]]
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = |exclude: &Value| {
        format!(
            "/regions/near-point?latitude=-23.56&longitude=-46.64&maxDistance=5000&excludeUserId={}",
            exclude.as_str().unwrap()
        )
    };

    let (status, own) = send(&app, "GET", &uri(&owner["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(own.as_array().unwrap().is_empty());

    let (_, others) = send(&app, "GET", &uri(&other["id"]), None).await;
    assert_eq!(others.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        "GET",
        "/regions/containing-point?latitude=95&longitude=0",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/regions",
        Some(json!({
            "user_id": "6f1c1b1e-4d3b-4c55-9a1f-2a7d8c0e9b11",
            "name": "open",
            "location": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_requires_exactly_one_location() {
    let (app, geocoder) = app();

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"name": "Maria", "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Maria",
            "email": "a@example.com",
            "coordinates": {"latitude": -23.5613, "longitude": -46.6565},
            "address": {
                "street": "Avenida Paulista", "number": "1578", "city": "São Paulo",
                "state": "SP", "country": "Brazil", "zip_code": "01310-200"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn users_share_cached_address() {
    let (app, geocoder) = app();

    let a = register(&app, "a@example.com").await;
    let (status, b) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "João",
            "email": "b@example.com",
            "address": {
                "street": "Avenida Paulista", "number": "1578", "city": "São Paulo",
                "state": "SP", "country": "Brazil", "zip_code": "01310-200"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(a["address_id"], b["address_id"]);
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Maria",
            "email": "a@example.com",
            "coordinates": {"latitude": -23.5613, "longitude": -46.6565}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, users) = send(&app, "GET", "/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let (app, _) = app();

    for uri in [
        "/regions/near-point?latitude=-23.56&longitude=-46.64&maxDistance=5000&excludeUserId=nope",
        "/regions/near-point?latitude=-23.56&longitude=-46.64",
        "/regions/containing-point?latitude=abc&longitude=0",
        "/regions/not-a-uuid",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/regions",
        Some(json!({"name": "no owner", "location": square(0.0, 1.0)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn near_point_across_antimeridian_is_bad_request() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        "GET",
        "/regions/near-point?latitude=0&longitude=179.99&maxDistance=5000&excludeUserId=6f1c1b1e-4d3b-4c55-9a1f-2a7d8c0e9b11",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("antimeridian"));
}
