//! End-to-end tests over the full router with an in-memory database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use axum_test::TestServer;
use coworkd_reservations::{AppState, Config, router};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;

async fn test_server() -> TestServer {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let config = Config::default().with_jwt_secret("test-secret");
    TestServer::new(router(AppState::new(pool, config))).unwrap()
}

async fn signup(server: &TestServer, email: &str, password: &str, is_admin: bool) -> String {
    let response = server
        .post("/signup")
        .json(&json!({
            "email": email,
            "password": password,
            "name": "Test User",
            "isAdmin": is_admin,
        }))
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn booking(venue: &str, date: &str, start: &str, end: &str) -> Value {
    json!({
        "venue": venue,
        "purpose": "Team sync",
        "date": date,
        "startTime": start,
        "endTime": end,
        "name": "Alice",
        "organization": "Acme",
        "maxParticipants": 10,
    })
}

#[tokio::test]
async fn test_signup_and_login() {
    let server = test_server().await;

    let response = server
        .post("/signup")
        .json(&json!({"email": "alice@x.com", "password": "pw123", "name": "Alice"}))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert_eq!(body["user"]["user_metadata"]["isAdmin"], false);
    assert!(body["access_token"].as_str().is_some());

    let response = server
        .post("/login")
        .json(&json!({"email": "alice@x.com", "password": "pw123"}))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .post("/login")
        .json(&json!({"email": "alice@x.com", "password": "wrong"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid credentials");

    // Unknown email gets the same message as a wrong password.
    let response = server
        .post("/login")
        .json(&json!({"email": "nobody@x.com", "password": "pw123"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_duplicate_signup_rejected() {
    let server = test_server().await;
    signup(&server, "alice@x.com", "pw123", false).await;

    let response = server
        .post("/signup")
        .json(&json!({"email": "alice@x.com", "password": "other"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "User already exists");
}

#[tokio::test]
async fn test_booking_conflict_flow() {
    let server = test_server().await;
    let token = signup(&server, "alice@x.com", "pw123", false).await;

    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-01-10", "09:00", "10:00"))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["reservation"]["status"], "confirmed");
    assert_eq!(body["reservation"]["userEmail"], "alice@x.com");

    // Overlapping window on the same venue and date.
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-01-10", "09:30", "10:30"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Time slot conflicts with existing reservation"
    );

    // Boundary-adjacent booking is fine: [09:00,10:00) then [10:00,11:00).
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-01-10", "10:00", "11:00"))
        .await;
    response.assert_status(StatusCode::OK);

    // Same window on another venue is fine too.
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("2", "2024-01-10", "09:00", "10:00"))
        .await;
    response.assert_status(StatusCode::OK);

    // And the same venue on another date.
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-01-11", "09:00", "10:00"))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_booking_window_is_hour_granular() {
    let server = test_server().await;
    let token = signup(&server, "alice@x.com", "pw123", false).await;

    for (start, end) in [("07:00", "09:00"), ("16:00", "18:00"), ("10:00", "10:00")] {
        let response = server
            .post("/reservations")
            .authorization_bearer(&token)
            .json(&booking("1", "2024-02-01", start, end))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Invalid time range. Reservations must be between 8:00 AM and 5:00 PM."
        );
    }

    // Minutes are ignored by the window check.
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-02-01", "08:30", "09:00"))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_participant_cap() {
    let server = test_server().await;
    let token = signup(&server, "alice@x.com", "pw123", false).await;

    let mut body = booking("1", "2024-03-01", "09:00", "10:00");
    body["maxParticipants"] = json!(20);
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::OK);

    let mut body = booking("1", "2024-03-01", "11:00", "12:00");
    body["maxParticipants"] = json!(21);
    let response = server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Maximum participants cannot exceed 20 people."
    );
}

#[tokio::test]
async fn test_listing_visibility() {
    let server = test_server().await;
    let alice = signup(&server, "alice@x.com", "pw123", false).await;
    let bob = signup(&server, "bob@x.com", "pw123", false).await;
    let admin = signup(&server, "admin@x.com", "pw123", true).await;

    for (token, start, end) in [(&alice, "09:00", "10:00"), (&alice, "10:00", "11:00"), (&bob, "11:00", "12:00")] {
        server
            .post("/reservations")
            .authorization_bearer(token)
            .json(&booking("1", "2024-04-01", start, end))
            .await
            .assert_status(StatusCode::OK);
    }

    let response = server
        .get("/reservations")
        .authorization_bearer(&alice)
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    let response = server.get("/reservations").authorization_bearer(&bob).await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server
        .get("/reservations")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 3);
}

#[tokio::test]
async fn test_delete_permissions() {
    let server = test_server().await;
    let alice = signup(&server, "alice@x.com", "pw123", false).await;
    let bob = signup(&server, "bob@x.com", "pw123", false).await;
    let admin = signup(&server, "admin@x.com", "pw123", true).await;

    let response = server
        .post("/reservations")
        .authorization_bearer(&alice)
        .json(&booking("1", "2024-05-01", "09:00", "10:00"))
        .await;
    let id = response.json::<Value>()["reservation"]["id"].as_i64().unwrap();

    // Not the owner, not an admin.
    let response = server
        .delete(&format!("/reservations/{id}"))
        .authorization_bearer(&bob)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Owner may delete.
    let response = server
        .delete(&format!("/reservations/{id}"))
        .authorization_bearer(&alice)
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], true);

    // Gone now.
    let response = server
        .delete(&format!("/reservations/{id}"))
        .authorization_bearer(&alice)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Admin may delete someone else's booking.
    let response = server
        .post("/reservations")
        .authorization_bearer(&alice)
        .json(&booking("1", "2024-05-02", "09:00", "10:00"))
        .await;
    let id = response.json::<Value>()["reservation"]["id"].as_i64().unwrap();
    let response = server
        .delete(&format!("/reservations/{id}"))
        .authorization_bearer(&admin)
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_attendance_requires_admin() {
    let server = test_server().await;
    let alice = signup(&server, "alice@x.com", "pw123", false).await;
    let admin = signup(&server, "admin@x.com", "pw123", true).await;

    let response = server
        .post("/reservations")
        .authorization_bearer(&alice)
        .json(&booking("1", "2024-06-01", "09:00", "10:00"))
        .await;
    let id = response.json::<Value>()["reservation"]["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/reservations/{id}/attendance"))
        .authorization_bearer(&alice)
        .json(&json!({"attendance": ["carol@x.com"]}))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "Admin access required");

    let response = server
        .put(&format!("/reservations/{id}/attendance"))
        .authorization_bearer(&admin)
        .json(&json!({"attendance": ["carol@x.com", "dave@x.com"]}))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .get(&format!("/reservations/{id}"))
        .authorization_bearer(&alice)
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["attendance"], json!(["carol@x.com", "dave@x.com"]));
}

#[tokio::test]
async fn test_attendance_unknown_id_is_silent_success() {
    let server = test_server().await;
    let admin = signup(&server, "admin@x.com", "pw123", true).await;

    let response = server
        .put("/reservations/9999/attendance")
        .authorization_bearer(&admin)
        .json(&json!({"attendance": ["carol@x.com"]}))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], true);
}

#[tokio::test]
async fn test_venue_catalog() {
    let server = test_server().await;

    let response = server.get("/venues").await;
    response.assert_status(StatusCode::OK);
    let venues = response.json::<Vec<Value>>();
    assert_eq!(venues.len(), 5);
    assert_eq!(venues[0]["name"], "Conference Room A");
    assert_eq!(venues[0]["capacity"], 20);

    let response = server.get("/venues/3").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["name"], "Meeting Room 1");

    let response = server.get("/venues/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability() {
    let server = test_server().await;
    let token = signup(&server, "alice@x.com", "pw123", false).await;

    // Requires a token.
    let response = server.get("/venues/1/availability?date=2024-07-01").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/reservations")
        .authorization_bearer(&token)
        .json(&booking("1", "2024-07-01", "09:00", "11:00"))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .get("/venues/1/availability?date=2024-07-01")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["reservations"].as_array().unwrap().len(), 1);
    // Nine hourly slots minus the two booked hours.
    let free = body["freeSlots"].as_array().unwrap();
    assert_eq!(free.len(), 7);
    assert_eq!(free[0]["start"], "08:00");
    assert_eq!(free[1]["start"], "11:00");
}

#[tokio::test]
async fn test_auth_required() {
    let server = test_server().await;

    let response = server.get("/reservations").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/reservations")
        .authorization_bearer("not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let server = test_server().await;
    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");
}
