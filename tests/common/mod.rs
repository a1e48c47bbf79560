// tests/common/mod.rs
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use adopt_a_drain::api::http::http_router;
use adopt_a_drain::config::AppConfig;
use adopt_a_drain::geocoding::google::GeocodeResponse;
use adopt_a_drain::geocoding::{Location, StaticGeocoder};
use adopt_a_drain::notify::MemoryMailer;
use adopt_a_drain::state::AppState;
use adopt_a_drain::things::{MemoryThingStore, NewThing, Thing, ThingRepository};
use adopt_a_drain::users::{MemoryUserStore, NewUser, User, UserRepository};

pub const CITY_HALL_JSON: &str = include_str!("../fixtures/city_hall.json");

pub fn city_hall() -> Location {
    let response: GeocodeResponse = serde_json::from_str(CITY_HALL_JSON).expect("fixture parses");
    response.into_location().expect("fixture has a result")
}

/// Everything a request test needs: the router plus handles on the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub things: Arc<MemoryThingStore>,
    pub users: Arc<MemoryUserStore>,
    pub mailer: Arc<MemoryMailer>,
    pub dan: User,
    pub thing_1: Thing,
    pub thing_2: Thing,
}

pub async fn test_app() -> TestApp {
    let things = Arc::new(MemoryThingStore::new());
    let users = Arc::new(MemoryUserStore::new());
    let mailer = Arc::new(MemoryMailer::new());

    let dan = users
        .create(NewUser {
            name: "Dan".to_string(),
            email: "dan@example.com".to_string(),
            api_token: "dan-token".to_string(),
        })
        .await
        .unwrap();
    let thing_1 = things
        .insert(NewThing { name: "Drain 1".to_string(), lat: 42.383339, lng: -71.049226 })
        .await
        .unwrap();
    let thing_2 = things
        .insert(NewThing { name: "Drain 2".to_string(), lat: 42.360000, lng: -71.058000 })
        .await
        .unwrap();

    let geocoder = StaticGeocoder::new()
        .with_location(city_hall())
        .with_address("1 City Hall Square, Boston, MA", city_hall());

    let state = AppState::new(
        AppConfig::default(),
        things.clone(),
        users.clone(),
        Arc::new(geocoder),
        mailer.clone(),
    );

    TestApp {
        router: http_router(Arc::new(state)),
        things,
        users,
        mailer,
        dan,
        thing_1,
        thing_2,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn put_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
