use crate::api::{AppState, app};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::in_memory(), Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, id: &str, name: &str) {
    let (status, _) = send(
        app,
        Method::PUT,
        &format!("/api/users/{}", id),
        Some(json!({ "display_name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_family(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/groups",
        Some(json!({ "name": "Family", "creator_id": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_membership_flow_over_http() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    register(&app, "bob", "Bob").await;
    let group_id = create_family(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/groups/{}/members", group_id),
        Some(json!({ "user_id": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_admin"], false);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/groups/{}/admins/alice", group_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("only admin"));

    let (status, body) = send(&app, Method::POST, &format!("/api/groups/{}/admins/bob", group_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], true);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/groups/{}/admins/alice", group_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/api/groups/{}/members/alice", group_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "is_member": true, "is_admin": false }));

    let (status, body) = send(&app, Method::GET, &format!("/api/groups/{}/members", group_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/api/users/bob/groups", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], group_id.as_str());
}

#[tokio::test]
async fn test_duplicate_member_is_conflict() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    let group_id = create_family(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/groups/{}/members", group_id),
        Some(json!({ "user_id": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(&app, Method::GET, &format!("/api/groups/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, &format!("/api/groups/{}/members", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/groups",
        Some(json!({ "name": "", "creator_id": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name cannot be empty");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/groups",
        Some(json!({ "name": "Family", "creator_id": "mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_and_event_lifecycle() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    let group_id = create_family(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/groups/{}", group_id),
        Some(json!({ "name": "Extended family", "description": "Everyone" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Extended family");

    let (status, event) = send(
        &app,
        Method::POST,
        &format!("/api/groups/{}/events", group_id),
        Some(json!({ "name": "Christmas" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/events/{}", event_id),
        Some(json!({ "name": "Christmas Eve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Christmas Eve");

    let (status, body) = send(&app, Method::GET, &format!("/api/groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["events"][0]["name"], "Christmas Eve");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/events/{}", event_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/groups/{}/events", group_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, logs) = send(&app, Method::GET, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|log| log["action"].as_str())
        .collect();
    assert_eq!(
        actions,
        vec![
            "GROUP_CREATED",
            "GROUP_UPDATED",
            "EVENT_CREATED",
            "EVENT_UPDATED",
            "EVENT_DELETED",
            "GROUP_DELETED"
        ]
    );
}

#[tokio::test]
async fn test_delete_user_clears_memberships() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    register(&app, "bob", "Bob").await;
    let group_id = create_family(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/api/groups/{}/members", group_id),
        Some(json!({ "user_id": "bob" })),
    )
    .await;

    let (status, _) = send(&app, Method::DELETE, "/api/users/alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &format!("/api/groups/{}/members/bob", group_id), None).await;
    assert_eq!(body, json!({ "is_member": true, "is_admin": true }));
    let (_, body) = send(&app, Method::GET, &format!("/api/groups/{}", group_id), None).await;
    assert_eq!(body["members"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/groups/{}/members/bob", group_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, "/api/users/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_group_keeps_creation_time() {
    let app = test_app();
    register(&app, "alice", "Alice").await;
    let group_id = create_family(&app).await;
    let (_, before) = send(&app, Method::GET, &format!("/api/groups/{}", group_id), None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/groups/{}", group_id),
        Some(json!({ "name": "Cousins" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], group_id.as_str());
    assert_eq!(body["created_at"], before["group"]["created_at"]);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/groups/{}", missing),
        Some(json!({ "name": "Ghosts" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
