mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use school_store::app_state::AppState;
use school_store::build_router;
use school_store::config::{Config, StoreBackend};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{fixture, Fixture, PASSWORD};

fn app(fx: &Fixture) -> Router {
    let mut config = Config::new("test-secret");
    config.store_backend = StoreBackend::Memory;
    config.bcrypt_cost = 4;
    build_router(AppState::new(fx.shared(), config))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_checks_answer_without_a_token() {
    let fx = fixture().await;
    let app = app(&fx);

    let (status, body) = send(&app, Method::GET, "/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn private_routes_require_a_valid_token() {
    let fx = fixture().await;
    let app = app(&fx);

    let (status, body) = send(&app, Method::GET, "/requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::GET, "/requests", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let fx = fixture().await;
    let app = app(&fx);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "full_name": "Jane Mwangi",
            "email": "Jane@School.test",
            "password": PASSWORD,
            "role": "bursar"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "jane@school.test");
    assert_eq!(body["data"]["role"], "teacher");
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "full_name": "Again", "email": "jane@school.test", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "jane@school.test", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "jane@school.test").await;
    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "teacher");
}

#[tokio::test]
async fn self_registered_profiles_cannot_decide_until_an_admin_assigns_a_role() {
    let fx = fixture().await;
    let app = app(&fx);
    let teacher = login(&app, &fx.teacher.email).await;
    let admin = login(&app, &fx.admin.email).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "full_name": "Eve", "email": "eve@school.test", "password": PASSWORD, "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let eve_id = body["data"]["id"].as_str().unwrap().to_string();
    let eve = login(&app, "eve@school.test").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&teacher),
        Some(json!({ "item_id": fx.slides.id, "quantity": 5, "request_type": "add_stock", "reason": "restock" })),
    )
    .await;
    let approve = format!("/requests/{}/approve", body["data"]["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::POST, &approve, Some(&eve), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, "/audit-logs", Some(&eve), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only admins hand out roles.
    let assign = format!("/profiles/{eve_id}/role");
    let (status, _) = send(&app, Method::PUT, &assign, Some(&eve), Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PUT, &assign, Some(&admin), Some(json!({ "role": "storekeeper" }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "storekeeper");

    // Same token; the gate reads the updated profile.
    let (status, body) = send(&app, Method::POST, &approve, Some(&eve), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["request"]["status"], "approved");

    let missing = format!("/profiles/{}/role", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::PUT, &missing, Some(&admin), Some(json!({ "role": "bursar" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_approval_flow_over_http() {
    let fx = fixture().await;
    let app = app(&fx);
    let teacher = login(&app, &fx.teacher.email).await;
    let storekeeper = login(&app, &fx.storekeeper.email).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&teacher),
        Some(json!({
            "item_id": fx.slides.id,
            "quantity": 50,
            "request_type": "add_stock",
            "reason": "restock"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&teacher),
        Some(json!({
            "item_id": fx.slides.id,
            "quantity": -1,
            "request_type": "remove_stock",
            "reason": "typo"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Teachers get no approve control.
    let uri = format!("/requests/{id}/approve");
    let (status, _) = send(&app, Method::POST, &uri, Some(&teacher), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&storekeeper),
        Some(json!({ "comments": "approved by teacher" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["request"]["status"], "approved");
    assert_eq!(body["data"]["request"]["approved_by"], fx.storekeeper.id.to_string());
    assert_eq!(body["data"]["approval"]["comments"], "approved by teacher");

    let (status, body) = send(&app, Method::POST, &format!("/requests/{id}/reject"), Some(&storekeeper), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"]["current_status"], "approved");

    let (status, body) = send(&app, Method::GET, &format!("/requests/{id}"), Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item_name"], "Microscope Slides");
    assert_eq!(body["data"]["approvals"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/requests?status=approved&search=slides", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["quantity"], 50);
    assert_eq!(listed[0]["request_type"], "add_stock");
    assert_eq!(listed[0]["reason"], "restock");

    let (status, body) = send(&app, Method::GET, "/notifications", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Stock request approved");
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let fx = fixture().await;
    let app = app(&fx);
    let storekeeper = login(&app, &fx.storekeeper.email).await;

    let uri = format!("/requests/{}/approve", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::POST, &uri, Some(&storekeeper), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_logs_are_admin_only() {
    let fx = fixture().await;
    let app = app(&fx);
    let teacher = login(&app, &fx.teacher.email).await;
    let admin = login(&app, &fx.admin.email).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&teacher),
        Some(json!({ "item_id": fx.slides.id, "quantity": 2, "request_type": "remove_stock", "reason": "lesson" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::GET, "/audit-logs", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/audit-logs?limit=5", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["action"], "stock_request.created");
}

#[tokio::test]
async fn catalog_reads_and_aggregates() {
    let fx = fixture().await;
    let app = app(&fx);
    let token = login(&app, &fx.teacher.email).await;

    let (status, body) = send(&app, Method::GET, "/items?low_stock_only=true", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Microscope Slides");

    let (status, body) = send(&app, Method::GET, "/items/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 2);
    assert_eq!(body["data"]["total_quantity"], 44);
    assert_eq!(body["data"]["low_stock_count"], 1);
    assert_eq!(body["data"]["store_count"], 1);

    let (status, body) = send(&app, Method::GET, "/stores", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], fx.lab.name.as_str());

    let (status, body) = send(&app, Method::GET, "/assets/valuation?as_of=2026-01-01", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"][0]["category"], "Lab Equipment");
    let value = body["data"]["total_current_value"].as_f64().unwrap();
    assert!(value > 20_000.0 && value < 28_000.0, "got {value}");
}

#[tokio::test]
async fn messaging_function_logs_and_records_messages() {
    let fx = fixture().await;
    let app = app(&fx);
    let teacher = login(&app, &fx.teacher.email).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&teacher),
        Some(json!({ "item_id": fx.slides.id, "quantity": 50, "request_type": "add_stock", "reason": "restock" })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/functions/send-whatsapp-message",
        Some(&teacher),
        Some(json!({ "requestId": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["recipient"], "store-admin");
    assert!(body["content"].as_str().unwrap().contains("50 x Microscope Slides"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/functions/send-whatsapp-message",
        Some(&teacher),
        Some(json!({ "to": "+254700111222", "message": "Lab keys returned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipient"], "+254700111222");
    assert_eq!(body["content"], "Lab keys returned");

    let (status, body) = send(
        &app,
        Method::POST,
        "/functions/send-whatsapp-message",
        Some(&teacher),
        Some(json!({ "requestId": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Stock request not found");

    let (status, body) = send(&app, Method::POST, "/functions/send-whatsapp-message", Some(&teacher), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].is_string());

    let garbled = Request::builder()
        .method(Method::POST)
        .uri("/functions/send-whatsapp-message")
        .header(header::AUTHORIZATION, format!("Bearer {teacher}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("requestId=not-json"))
        .unwrap();
    let (status, body) = dispatch(&app, garbled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body must be a JSON object");
    assert!(body["details"].is_string());

    let untyped = Request::builder()
        .method(Method::POST)
        .uri("/functions/send-whatsapp-message")
        .header(header::AUTHORIZATION, format!("Bearer {teacher}"))
        .body(Body::from("hello"))
        .unwrap();
    let (status, body) = dispatch(&app, untyped).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());

    // The request summary was also recorded against the requester.
    let (_, body) = send(&app, Method::GET, "/notifications", Some(&teacher), None).await;
    let channels: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["channel"].as_str().unwrap())
        .collect();
    assert_eq!(channels, vec!["whatsapp"]);
}
