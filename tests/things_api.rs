// tests/things_api.rs

mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use adopt_a_drain::api::http::http_router;
use adopt_a_drain::config::AppConfig;
use adopt_a_drain::error::FieldErrors;
use adopt_a_drain::geocoding::StaticGeocoder;
use adopt_a_drain::notify::MemoryMailer;
use adopt_a_drain::server::create_memory_pool;
use adopt_a_drain::state::AppState;
use adopt_a_drain::things::{MemoryThingStore, NewThing, SqliteThingStore, ThingRepository};
use adopt_a_drain::users::{MemoryUserStore, NewUser, SqliteUserStore, UserRepository};

use common::{get, put_json, send, test_app};

const NEAR: &str = "/things?lat=42.358431&lng=-71.059773";
const FAR: &str = "/things?lat=43.358431&lng=-71.059773";

#[tokio::test]
async fn lists_drains_near_a_point() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get(NEAR, None)).await;

    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // thing_2 is closer to the query point than thing_1
    assert_eq!(list[0]["id"], json!(app.thing_2.id));
    assert_eq!(list[1]["id"], json!(app.thing_1.id));
    assert_eq!(list[0]["owned_by_current_user"], json!(false));
}

#[tokio::test]
async fn list_honors_limit() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get(&format!("{NEAR}&limit=1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn returns_404_when_there_are_no_drains() {
    let things = Arc::new(MemoryThingStore::new());
    let state = AppState::new(
        AppConfig::default(),
        things,
        Arc::new(MemoryUserStore::new()),
        Arc::new(StaticGeocoder::new()),
        Arc::new(MemoryMailer::new()),
    );
    let router = http_router(Arc::new(state));

    let (status, body) = send(&router, get(FAR, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["address"], json!(["Could not find drain."]));
}

#[tokio::test]
async fn returns_404_when_drains_are_out_of_range() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get(FAR, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["address"], json!(["Could not find drain."]));
}

#[tokio::test]
async fn rejects_missing_or_invalid_coordinates() {
    let app = test_app().await;
    let (status, _) = send(&app.router, get("/things?lat=42.3", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, get("/things?lat=142.3&lng=-71.0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn marks_drains_owned_by_signed_in_user() {
    let app = test_app().await;
    app.things.assign_owner(app.thing_1.id, Some(app.dan.id)).await.unwrap();

    let (status, body) = send(&app.router, get(NEAR, Some("dan-token"))).await;
    assert_eq!(status, StatusCode::OK);

    let owned: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["owned_by_current_user"] == json!(true))
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(owned, vec![app.thing_1.id]);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = test_app().await;
    let (status, _) = send(&app.router, get(NEAR, Some("nobody"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn updates_drain_display_name() {
    let app = test_app().await;
    assert_ne!(app.thing_1.display_name(), "Birdsill");

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"user_id": app.dan.id, "adopted_name": "Birdsill"}});
    let (status, response) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["display_name"], json!("Birdsill"));
    let reloaded = app.things.get(app.thing_1.id).await.unwrap();
    assert_eq!(reloaded.display_name(), "Birdsill");
}

#[tokio::test]
async fn errors_when_save_is_rejected() {
    let app = test_app().await;
    app.things.reject_saves(FieldErrors::single("base", "could not be saved")).await;

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "hello"}});
    let (status, response) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert!(status.is_client_error() || status.is_server_error());
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["errors"]["base"], json!(["could not be saved"]));
    assert_eq!(app.things.get(app.thing_1.id).await.unwrap(), app.thing_1);
    assert!(app.mailer.deliveries().await.is_empty());
}

#[tokio::test]
async fn update_requires_sign_in() {
    let app = test_app().await;
    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "Drain", "user_id": app.dan.id}});
    let (status, _) = send(&app.router, put_json(&uri, None, &body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!app.things.get(app.thing_1.id).await.unwrap().adopted());
    assert!(app.mailer.deliveries().await.is_empty());
}

#[tokio::test]
async fn update_of_missing_drain_is_404() {
    let app = test_app().await;
    let body = json!({"thing": {"adopted_name": "Drain"}});
    let (status, _) = send(&app.router, put_json("/things/9999", Some("dan-token"), &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adoption_sends_confirmation_email() {
    let app = test_app().await;
    let before = app.mailer.deliveries().await.len();

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "Drain", "user_id": app.dan.id}});
    let (status, _) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.things.get(app.thing_1.id).await.unwrap().adopted());
    assert_eq!(app.mailer.deliveries().await.len(), before + 1);

    let email = app.mailer.last().await.unwrap();
    assert_eq!(email.to, vec![app.dan.email.clone()]);
    assert_eq!(email.subject, "Thanks for adopting a drain, Dan!");
    assert!(email.body.contains("City Hall"));
}

#[tokio::test]
async fn second_adoption_sends_repeat_email() {
    let app = test_app().await;
    app.things.assign_owner(app.thing_2.id, Some(app.dan.id)).await.unwrap();

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "Drain", "user_id": app.dan.id}});
    let (status, _) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.things.get(app.thing_1.id).await.unwrap().adopted());

    let email = app.mailer.last().await.unwrap();
    assert_eq!(email.to, vec![app.dan.email.clone()]);
    assert_eq!(email.subject, "Thanks for adopting another drain, Dan!");
}

#[tokio::test]
async fn adoption_survives_mail_failure() {
    let app = test_app().await;
    app.mailer.reject_deliveries("mail API unavailable").await;

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "Birdsill", "user_id": app.dan.id}});
    let (status, response) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["adopted"], json!(true));
    assert_eq!(response["display_name"], json!("Birdsill"));

    let stored = app.things.get(app.thing_1.id).await.unwrap();
    assert_eq!(stored.user_id, Some(app.dan.id));
    assert_eq!(stored.display_name(), "Birdsill");
    assert!(app.mailer.deliveries().await.is_empty());
}

#[tokio::test]
async fn abandonment_sends_no_email() {
    let app = test_app().await;
    app.things.assign_owner(app.thing_1.id, Some(app.dan.id)).await.unwrap();
    let before = app.mailer.deliveries().await.len();

    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"adopted_name": "Another Drain", "user_id": null}});
    let (status, response) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["adopted"], json!(false));
    assert!(!app.things.get(app.thing_1.id).await.unwrap().adopted());
    assert_eq!(app.mailer.deliveries().await.len(), before);
}

#[tokio::test]
async fn collection_put_takes_id_from_body() {
    let app = test_app().await;
    let body = json!({"id": app.thing_1.id, "thing": {"adopted_name": "Birdsill", "user_id": app.dan.id}});
    let (status, response) = send(&app.router, put_json("/things", Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["display_name"], json!("Birdsill"));
    assert_eq!(response["owned_by_current_user"], json!(true));
    assert_eq!(app.mailer.deliveries().await.len(), 1);
}

#[tokio::test]
async fn adopting_for_unknown_user_is_a_validation_error() {
    let app = test_app().await;
    let uri = format!("/things/{}", app.thing_1.id);
    let body = json!({"thing": {"user_id": 4242}});
    let (status, response) = send(&app.router, put_json(&uri, Some("dan-token"), &body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["errors"]["user_id"], json!(["does not exist"]));
}

#[tokio::test]
async fn address_lookup() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        get("/address?address=1%20City%20Hall%20Square&city_state=Boston%2C%20MA", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lat"], json!(42.383339));

    let (status, body) = send(&app.router, get("/address?address=Nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["address"], json!(["Could not find address."]));

    let (status, _) = send(&app.router, get("/address", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_check() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn sqlite_backed_adoption_flow() {
    let pool = create_memory_pool().await.unwrap();
    let things = Arc::new(SqliteThingStore::new(pool.clone()));
    let users = Arc::new(SqliteUserStore::new(pool));
    let mailer = Arc::new(MemoryMailer::new());

    let dan = users
        .create(NewUser {
            name: "Dan".to_string(),
            email: "dan@example.com".to_string(),
            api_token: "dan-token".to_string(),
        })
        .await
        .unwrap();
    let thing = things
        .insert(NewThing { name: "Drain 1".to_string(), lat: 42.383339, lng: -71.049226 })
        .await
        .unwrap();

    let state = AppState::new(
        AppConfig::default(),
        things.clone(),
        users,
        Arc::new(StaticGeocoder::new().with_location(common::city_hall())),
        mailer.clone(),
    );
    let router = http_router(Arc::new(state));

    let (status, body) = send(&router, get(NEAR, Some("dan-token"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], json!(thing.id));

    let uri = format!("/things/{}", thing.id);
    let patch = json!({"thing": {"adopted_name": "Birdsill", "user_id": dan.id}});
    let (status, _) = send(&router, put_json(&uri, Some("dan-token"), &patch)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = things.get(thing.id).await.unwrap();
    assert_eq!(stored.display_name(), "Birdsill");
    assert_eq!(stored.user_id, Some(dan.id));
    assert_eq!(mailer.last().await.unwrap().subject, "Thanks for adopting a drain, Dan!");
}
