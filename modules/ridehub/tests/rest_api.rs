#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use support::harness;

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    location: Option<String>,
    body: Value,
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        req = req.header("x-user-id", user.to_string());
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Reply {
        status,
        content_type: header_str(header::CONTENT_TYPE),
        location: header_str(header::LOCATION),
        body,
    }
}

async fn signup(app: &Router, email: &str) -> Uuid {
    let id = Uuid::now_v7();
    let reply = call(
        app,
        Method::PUT,
        "/api/me",
        Some(id),
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    id
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_is_public() {
    let h = harness().await;
    let app = h.app.router();

    let reply = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn api_routes_require_a_caller() {
    let h = harness().await;
    let app = h.app.router();

    let reply = call(&app, Method::GET, "/api/me", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["status"], 401);
    assert_eq!(reply.body["code"], "UNAUTHORIZED");
    assert!(reply.body["error"].is_string());
    assert_eq!(
        reply.content_type.as_deref(),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn profile_lifecycle() {
    let h = harness().await;
    let app = h.app.router();
    let me = Uuid::now_v7();

    let reply = call(&app, Method::GET, "/api/me", Some(me), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["code"], "NOT_FOUND");

    let reply = call(
        &app,
        Method::PUT,
        "/api/me",
        Some(me),
        Some(json!({ "email": " Rider@Example.COM ", "display_name": "Rider One" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["email"], "rider@example.com");

    let other = Uuid::now_v7();
    let reply = call(
        &app,
        Method::PUT,
        "/api/me",
        Some(other),
        Some(json!({ "email": "rider@example.com" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["code"], "CONFLICT");

    let reply = call(
        &app,
        Method::GET,
        "/api/users?q=rider",
        Some(me),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["total"], 1);
}

#[tokio::test]
async fn unknown_json_fields_are_a_bad_request() {
    let h = harness().await;
    let app = h.app.router();
    let me = signup(&app, "alice@example.com").await;

    let reply = call(
        &app,
        Method::POST,
        "/api/communities",
        Some(me),
        Some(json!({ "name": "Velo Club", "kind": "CLUB", "colour": "red" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "VALIDATION");
}

#[tokio::test]
async fn community_chapter_and_ride_flow() {
    let h = harness().await;
    let app = h.app.router();
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    let reply = call(
        &app,
        Method::POST,
        "/api/communities",
        Some(alice),
        Some(json!({ "name": "Velo Club", "kind": "club" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    assert_eq!(reply.body["slug"], "velo-club");
    let community = id_of(&reply.body);
    assert_eq!(
        reply.location.as_deref(),
        Some(format!("/api/communities/{community}").as_str())
    );

    let reply = call(
        &app,
        Method::POST,
        &format!("/api/communities/{community}/chapters"),
        Some(bob),
        Some(json!({ "name": "Oakland", "city": "Oakland" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["code"], "FORBIDDEN");

    let reply = call(
        &app,
        Method::POST,
        &format!("/api/communities/{community}/chapters"),
        Some(alice),
        Some(json!({ "name": "Oakland", "city": "Oakland" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let chapter = id_of(&reply.body);

    let join = format!("/api/chapters/{chapter}/join");
    let reply = call(&app, Method::POST, &join, Some(bob), None).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let reply = call(&app, Method::POST, &join, Some(bob), None).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = call(
        &app,
        Method::GET,
        &format!("/api/chapters/{chapter}"),
        Some(bob),
        None,
    )
    .await;
    assert_eq!(reply.body["member_count"], 2);

    let start = (OffsetDateTime::now_utc() + Duration::days(2))
        .format(&Rfc3339)
        .unwrap();
    let reply = call(
        &app,
        Method::POST,
        "/api/rides",
        Some(alice),
        Some(json!({
            "chapter_id": chapter,
            "title": "Weekly Hills",
            "start_time": start,
            "recurrence": "weekly",
            "recurrence_count": 3
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let rides = reply.body["rides"].as_array().unwrap();
    assert_eq!(rides.len(), 3);
    let first = id_of(&rides[0]);

    let reply = call(
        &app,
        Method::PUT,
        &format!("/api/rides/{first}/rsvp"),
        Some(bob),
        Some(json!({ "status": "going" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

    let reply = call(
        &app,
        Method::GET,
        &format!("/api/rides/{first}"),
        Some(bob),
        None,
    )
    .await;
    assert_eq!(reply.body["rsvp_counts"]["going"], 1);
    assert_eq!(reply.body["my_rsvp"], "GOING");

    let reply = call(
        &app,
        Method::DELETE,
        &format!("/api/rides/{first}?scope=everything"),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = call(
        &app,
        Method::DELETE,
        &format!("/api/rides/{first}?scope=series"),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["deleted"], 3);

    let reply = call(
        &app,
        Method::GET,
        &format!("/api/rides/{first}"),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_path_ids_are_rejected() {
    let h = harness().await;
    let app = h.app.router();
    let me = signup(&app, "alice@example.com").await;

    let reply = call(&app, Method::GET, "/api/chapters/not-a-uuid", Some(me), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "VALIDATION");
}

#[tokio::test]
async fn strava_callback_is_public_and_checks_state() {
    let h = harness().await;
    let app = h.app.router();

    let reply = call(
        &app,
        Method::GET,
        "/api/strava/callback?error=access_denied",
        None,
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = call(
        &app,
        Method::GET,
        "/api/strava/callback?code=abc&state=forged",
        None,
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "VALIDATION");

    let me = signup(&app, "alice@example.com").await;
    let reply = call(&app, Method::GET, "/api/strava/connect", Some(me), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let url = reply.body["url"].as_str().unwrap();
    let state = url.split("state=").nth(1).unwrap();

    let reply = call(
        &app,
        Method::GET,
        &format!("/api/strava/callback?code=abc&state={state}&scope=read"),
        None,
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["athlete_id"], support::ATHLETE_ID);
    assert!(reply.body.get("access_token").is_none());
    assert!(reply.body.get("refresh_token").is_none());
}

#[tokio::test]
async fn asset_endpoints_delegate_to_providers() {
    let h = harness().await;
    let app = h.app.router();
    let me = signup(&app, "alice@example.com").await;

    let reply = call(
        &app,
        Method::POST,
        "/api/uploads/images",
        Some(me),
        Some(json!({ "file": "https://cdn.example.com/logo.png", "folder": "sponsors" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert!(reply.body["url"].as_str().unwrap().contains("/sponsors/"));

    let reply = call(
        &app,
        Method::POST,
        "/api/uploads/images",
        Some(me),
        Some(json!({ "file": "ftp://nope" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = call(
        &app,
        Method::GET,
        "/api/brands/lookup?domain=https://www.Rapha.cc/shop",
        Some(me),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["domain"], "rapha.cc");

    let reply = call(
        &app,
        Method::GET,
        "/api/brands/lookup?domain=unknown.test",
        Some(me),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
