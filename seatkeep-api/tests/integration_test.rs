use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use seatkeep_api::{app, AppState, AuthConfig};
use seatkeep_core::{InMemoryStore, ManualClock, ReservationPolicy, SeatRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, h, m, 0).unwrap()
}

struct TestApp {
    router: Router,
    store: InMemoryStore,
    clock: Arc<ManualClock>,
}

fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(at(9, 0)));
    let store = InMemoryStore::with_clock(clock.clone());
    let state = AppState::new(
        Arc::new(store.clone()),
        clock.clone(),
        ReservationPolicy::default(),
        AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        FixedOffset::east_opt(7 * 3600).unwrap(),
    );
    TestApp { router: app(state), store, clock }
}

async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(router: &Router, email: &str) -> (String, String) {
    let (status, body) = send(router, Method::POST, "/v1/login", None, Some(json!({ "email": email }))).await;
    assert_eq!(status, StatusCode::OK);
    (
        body["token"].as_str().unwrap().to_string(),
        body["user_id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();
    let (status, body) = send(&app.router, Method::GET, "/v1/seats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = send(&app.router, Method::GET, "/v1/seats", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_login_is_idempotent_per_email() {
    let app = test_app();
    let (_, first) = login(&app.router, "alice@example.com").await;
    let (_, second) = login(&app.router, "alice@example.com").await;
    assert_eq!(first, second);

    let (status, body) = send(&app.router, Method::POST, "/v1/login", None, Some(json!({ "email": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_login_keeps_name() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({ "email": "alice@example.com", "name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");

    // Email-only login leaves the stored name alone
    let (_, body) = send(&app.router, Method::POST, "/v1/login", None, Some(json!({ "email": "alice@example.com" }))).await;
    assert_eq!(body["name"], "Alice");
}

#[tokio::test]
async fn test_booking_and_check_in_flow() {
    let app = test_app();
    let a1 = app.store.add_seat("A1").await.unwrap();
    let (alice, alice_id) = login(&app.router, "alice").await;
    let (bob, _) = login(&app.router, "bob").await;

    let (status, reservation) = send(
        &app.router,
        Method::POST,
        "/v1/reservations",
        Some(&alice),
        Some(json!({ "seat_number": "A1", "from_time": "2030-01-01T10:00:00Z", "to_time": "2030-01-01T11:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["status"], "UNCONFIRMED");
    assert_eq!(reservation["user_id"], alice_id.as_str());
    assert_eq!(reservation["check_in_deadline"], "2030-01-01T10:10:00Z");

    // Local format at +07:00: 17:30 is 10:30Z
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/v1/reservations",
        Some(&bob),
        Some(json!({ "seat_number": "A1", "from_time": "2030-01-01 17:30", "to_time": "2030-01-01 17:45" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "seat_conflict");

    let check_in_uri = format!("/v1/reservations/{}/check-in", reservation["id"].as_str().unwrap());

    // Bob cannot check in to Alice's reservation
    let (status, body) = send(&app.router, Method::POST, &check_in_uri, Some(&bob), Some(json!({ "seat_id": a1.id }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "mismatch");

    app.clock.set(at(10, 5));
    let (status, body) = send(&app.router, Method::POST, &check_in_uri, Some(&alice), Some(json!({ "seat_id": a1.id }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    let (status, body) = send(&app.router, Method::POST, &check_in_uri, Some(&alice), Some(json!({ "seat_id": a1.id }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_confirmed");
}

#[tokio::test]
async fn test_late_check_in_is_gone() {
    let app = test_app();
    let a1 = app.store.add_seat("A1").await.unwrap();
    let (alice, _) = login(&app.router, "alice").await;

    let (_, reservation) = send(
        &app.router,
        Method::POST,
        "/v1/reservations",
        Some(&alice),
        Some(json!({ "seat_number": "A1", "from_time": "2030-01-01T10:00:00Z", "to_time": "2030-01-01T11:00:00Z" })),
    )
    .await;

    app.clock.set(at(10, 10) + Duration::seconds(1));
    let uri = format!("/v1/reservations/{}/check-in", reservation["id"].as_str().unwrap());
    let (status, body) = send(&app.router, Method::POST, &uri, Some(&alice), Some(json!({ "seat_id": a1.id }))).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["code"], "deadline_exceeded");
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let app = test_app();
    app.store.add_seat("A1").await.unwrap();
    let (alice, _) = login(&app.router, "alice").await;

    let cases = [
        (json!({ "seat_number": "Z9", "from_time": "2030-01-01T10:00:00Z", "to_time": "2030-01-01T11:00:00Z" }), StatusCode::NOT_FOUND, "not_found"),
        (json!({ "seat_number": "A1", "from_time": "2030-01-01T08:00:00Z", "to_time": "2030-01-01T11:00:00Z" }), StatusCode::BAD_REQUEST, "invalid_window"),
        (json!({ "seat_number": "A1", "from_time": "2030-01-01T11:00:00Z", "to_time": "2030-01-01T10:00:00Z" }), StatusCode::BAD_REQUEST, "invalid_window"),
        (json!({ "seat_number": "A1", "from_time": "soon", "to_time": "2030-01-01T10:00:00Z" }), StatusCode::BAD_REQUEST, "invalid_request"),
        // Differs only below a microsecond
        (json!({ "seat_number": "A1", "from_time": "2030-01-01T10:00:00.0000001Z", "to_time": "2030-01-01T10:00:00.0000009Z" }), StatusCode::BAD_REQUEST, "invalid_window"),
    ];

    for (body, expected_status, expected_code) in cases {
        let (status, response) = send(&app.router, Method::POST, "/v1/reservations", Some(&alice), Some(body)).await;
        assert_eq!(status, expected_status);
        assert_eq!(response["code"], expected_code);
    }
}

#[tokio::test]
async fn test_seat_listing_and_availability() {
    let app = test_app();
    let (alice, _) = login(&app.router, "alice").await;

    for number in ["B2", "A1"] {
        let (status, _) = send(&app.router, Method::POST, "/v1/seats", Some(&alice), Some(json!({ "number": number }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(&app.router, Method::POST, "/v1/seats", Some(&alice), Some(json!({ "number": "A1" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (_, seats) = send(&app.router, Method::GET, "/v1/seats", Some(&alice), None).await;
    let numbers: Vec<_> = seats.as_array().unwrap().iter().map(|s| s["number"].as_str().unwrap().to_string()).collect();
    assert_eq!(numbers, vec!["A1", "B2"]);

    send(
        &app.router,
        Method::POST,
        "/v1/reservations",
        Some(&alice),
        Some(json!({ "seat_number": "A1", "from_time": "2030-01-01T10:00:00Z", "to_time": "2030-01-01T11:00:00Z" })),
    )
    .await;

    let (status, free) = send(
        &app.router,
        Method::POST,
        "/v1/seats/available",
        Some(&alice),
        Some(json!({ "from_time": "2030-01-01T10:30:00Z", "to_time": "2030-01-01T12:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let free: Vec<_> = free.as_array().unwrap().iter().map(|s| s["number"].as_str().unwrap().to_string()).collect();
    assert_eq!(free, vec!["B2"]);
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let app = test_app();
    app.store.add_seat("A1").await.unwrap();
    let (alice, _) = login(&app.router, "alice").await;

    app.store.set_unavailable(true);
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/v1/reservations",
        Some(&alice),
        Some(json!({ "seat_number": "A1", "from_time": "2030-01-01T10:00:00Z", "to_time": "2030-01-01T11:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "store_unavailable");
}
