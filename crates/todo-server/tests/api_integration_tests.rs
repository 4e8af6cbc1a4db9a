//! Full lifecycle of a single todo through the HTTP surface:
//! create, toggle completion, read back, delete, then observe the miss.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use todo_server::{app, AppState, Db};

fn test_app() -> Router {
    let db = Db::open_in_memory().unwrap();
    app(AppState { db })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    json: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match json {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn todo_lifecycle() {
    let app = test_app();

    let (status, created) = send(
        &app,
        "POST",
        "/todos",
        Some(serde_json::json!({"title": "Buy milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created,
        serde_json::json!({"id": 1, "title": "Buy milk", "completed": false})
    );

    let (status, updated) = send(
        &app,
        "PATCH",
        "/todos/1",
        Some(serde_json::json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        serde_json::json!({"id": 1, "title": "Buy milk", "completed": true})
    );

    let (status, fetched) = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, deleted) = send(&app, "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, serde_json::json!({"message": "Todo deleted"}));

    let (status, _) = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_create_persists_nothing() {
    let app = test_app();

    let (status, _) = send(&app, "POST", "/todos", Some(serde_json::json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, serde_json::json!([]));
}
