//! One request function per API operation.

use serde_json::Value;

use crate::error::ClientError;
use crate::types::{CreateTodo, Deleted, Todo, UpdateTodo};

/// Thin reqwest wrapper over the todo API. Holds no state beyond the base
/// URL, so it is cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/todos", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo, ClientError> {
        let resp = self
            .http
            .get(format!("{}/todos/{id}", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        let resp = self
            .http
            .post(format!("{}/todos", self.base_url))
            .json(input)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_todo(&self, id: i64, input: &UpdateTodo) -> Result<Todo, ClientError> {
        let resp = self
            .http
            .patch(format!("{}/todos/{id}", self.base_url))
            .json(input)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_todo(&self, id: i64) -> Result<Deleted, ClientError> {
        let resp = self
            .http
            .delete(format!("{}/todos/{id}", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }
}

/// Maps a non-2xx status to a `ClientError` before deserializing the body.
async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.json::<T>().await?)
}
