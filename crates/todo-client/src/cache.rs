//! Query cache over [`ApiClient`].
//!
//! Queries resolve through per-key cells so concurrent consumers of the same
//! key share one in-flight request. Mutations invalidate the keys they
//! affect; the next query for an invalidated key refetches, so local state
//! converges to whatever the server holds once in-flight work settles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Cache key: one per query, parameterized by the identifying arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Todos,
    Todo(i64),
}

/// Observable state of a cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// No fetch has been started for this key.
    Idle,
    /// A fetch is in flight and has not settled.
    Loading,
    Error(ClientError),
    Ready(Value),
}

type Cell = Arc<OnceCell<Result<Value, ClientError>>>;

/// Caching front end over the API, one instance per UI session.
pub struct QueryClient {
    api: ApiClient,
    cells: Mutex<HashMap<QueryKey, Cell>>,
    updating: Mutex<HashSet<i64>>,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_api(ApiClient::new(base_url))
    }

    pub fn with_api(api: ApiClient) -> Self {
        Self {
            api,
            cells: Mutex::new(HashMap::new()),
            updating: Mutex::new(HashSet::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn cell(&self, key: QueryKey) -> Cell {
        self.cells.lock().entry(key).or_default().clone()
    }

    /// Resolve `key` through the cache. Concurrent callers share a single
    /// request; the settled result (success or error) stays cached until the
    /// key is invalidated.
    pub async fn fetch(&self, key: QueryKey) -> Result<Value, ClientError> {
        let cell = self.cell(key);
        cell.get_or_init(|| async {
            tracing::debug!(?key, "cache miss, fetching");
            match key {
                QueryKey::Todos => self.api.list_todos().await.and_then(to_value),
                QueryKey::Todo(id) => self.api.get_todo(id).await.and_then(to_value),
            }
        })
        .await
        .clone()
    }

    /// Typed query for the full list.
    pub async fn todos(&self) -> Result<Vec<Todo>, ClientError> {
        from_value(self.fetch(QueryKey::Todos).await?)
    }

    /// Typed query for a single todo.
    pub async fn todo(&self, id: i64) -> Result<Todo, ClientError> {
        from_value(self.fetch(QueryKey::Todo(id)).await?)
    }

    /// Current state of a key, without triggering a fetch.
    pub fn state(&self, key: QueryKey) -> QueryState {
        let cells = self.cells.lock();
        match cells.get(&key) {
            None => QueryState::Idle,
            Some(cell) => match cell.get() {
                None => QueryState::Loading,
                Some(Ok(v)) => QueryState::Ready(v.clone()),
                Some(Err(e)) => QueryState::Error(e.clone()),
            },
        }
    }

    /// Drop the cached entry; the next fetch for this key hits the server.
    pub fn invalidate(&self, key: QueryKey) {
        self.cells.lock().remove(&key);
    }

    /// Create a todo, then invalidate the list so it refetches.
    pub async fn create_todo(&self, title: &str) -> Result<Todo, ClientError> {
        let todo = self
            .api
            .create_todo(&CreateTodo {
                title: title.to_string(),
            })
            .await?;
        self.invalidate(QueryKey::Todos);
        Ok(todo)
    }

    /// True while an update for `id` is in flight. Row controls for that id
    /// should be disabled when this returns true; other ids are unaffected.
    pub fn is_updating(&self, id: i64) -> bool {
        self.updating.lock().contains(&id)
    }

    /// Apply a partial update. A second update for the same id is refused
    /// while the first is still in flight.
    pub async fn update_todo(&self, id: i64, update: UpdateTodo) -> Result<Todo, ClientError> {
        let _guard = UpdateGuard::acquire(&self.updating, id)?;
        let result = self.api.update_todo(id, &update).await;
        if result.is_ok() {
            self.invalidate(QueryKey::Todos);
            self.invalidate(QueryKey::Todo(id));
        }
        result
    }

    /// Checkbox toggle: update `completed` only.
    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Todo, ClientError> {
        self.update_todo(
            id,
            UpdateTodo {
                title: None,
                completed: Some(completed),
            },
        )
        .await
    }

    /// Inline title edit: update `title` only.
    pub async fn rename_todo(&self, id: i64, title: &str) -> Result<Todo, ClientError> {
        self.update_todo(
            id,
            UpdateTodo {
                title: Some(title.to_string()),
                completed: None,
            },
        )
        .await
    }

    /// Delete a todo, then invalidate both the list and the item key.
    pub async fn delete_todo(&self, id: i64) -> Result<(), ClientError> {
        self.api.delete_todo(id).await?;
        self.invalidate(QueryKey::Todos);
        self.invalidate(QueryKey::Todo(id));
        Ok(())
    }
}

/// Releases the per-id update slot even if the request future is dropped.
struct UpdateGuard<'a> {
    updating: &'a Mutex<HashSet<i64>>,
    id: i64,
}

impl<'a> UpdateGuard<'a> {
    fn acquire(updating: &'a Mutex<HashSet<i64>>, id: i64) -> Result<Self, ClientError> {
        if !updating.lock().insert(id) {
            return Err(ClientError::UpdateInFlight(id));
        }
        Ok(Self { updating, id })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.updating.lock().remove(&self.id);
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_idle_before_any_fetch() {
        let client = QueryClient::new("http://127.0.0.1:1");
        assert_eq!(client.state(QueryKey::Todos), QueryState::Idle);
        assert_eq!(client.state(QueryKey::Todo(1)), QueryState::Idle);
    }

    #[test]
    fn update_guard_is_per_id() {
        let updating = Mutex::new(HashSet::new());
        let first = UpdateGuard::acquire(&updating, 1).unwrap();
        assert_eq!(
            UpdateGuard::acquire(&updating, 1).err(),
            Some(ClientError::UpdateInFlight(1))
        );
        // A different id is not blocked.
        let other = UpdateGuard::acquire(&updating, 2).unwrap();
        drop(first);
        drop(other);
        assert!(UpdateGuard::acquire(&updating, 1).is_ok());
    }
}
