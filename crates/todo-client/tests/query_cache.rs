//! Cache behavior that needs a controllable upstream: request deduplication
//! and the per-id update guard. Each test builds its own minimal router so
//! it can count hits or slow responses down.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};

use todo_client::{ClientError, QueryClient, QueryKey, QueryState, Todo};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn concurrent_queries_share_one_request() {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn list(State(hits): State<Arc<AtomicUsize>>) -> Json<Vec<Todo>> {
        hits.fetch_add(1, Ordering::SeqCst);
        // Hold the response open so every caller subscribes before it lands.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Json(vec![])
    }

    let router = Router::new()
        .route("/todos", get(list))
        .with_state(hits.clone());
    let base_url = spawn(router).await;

    let client = Arc::new(QueryClient::new(&base_url));
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move { client.todos().await }));
    }
    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_empty());
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // A fresh fetch after invalidation does hit the server again.
    client.invalidate(QueryKey::Todos);
    client.todos().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn state_is_loading_while_a_fetch_is_in_flight() {
    async fn slow_list() -> Json<Vec<Todo>> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Json(vec![])
    }

    let router = Router::new().route("/todos", get(slow_list));
    let base_url = spawn(router).await;

    let client = Arc::new(QueryClient::new(&base_url));
    assert_eq!(client.state(QueryKey::Todos), QueryState::Idle);

    let background = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.todos().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.state(QueryKey::Todos), QueryState::Loading);

    background.await.unwrap().unwrap();
    assert!(matches!(
        client.state(QueryKey::Todos),
        QueryState::Ready(_)
    ));
}

#[tokio::test]
async fn second_update_for_same_id_is_refused_while_in_flight() {
    async fn slow_patch(Path(id): Path<i64>) -> Json<Todo> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Json(Todo {
            id,
            title: "slow".to_string(),
            completed: true,
        })
    }

    let router = Router::new().route("/todos/:id", patch(slow_patch));
    let base_url = spawn(router).await;

    let client = Arc::new(QueryClient::new(&base_url));
    assert!(!client.is_updating(1));

    let background = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.set_completed(1, true).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.is_updating(1));
    assert!(!client.is_updating(2));

    // The same id is guarded; a different id is not.
    assert_eq!(
        client.set_completed(1, false).await,
        Err(ClientError::UpdateInFlight(1))
    );

    let updated = background.await.unwrap().unwrap();
    assert_eq!(updated.id, 1);
    assert!(updated.completed);
    assert!(!client.is_updating(1));
}
