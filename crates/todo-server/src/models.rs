use serde::{Deserialize, Serialize};

/// A row of the `todos` table, also the JSON shape of every item response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// POST /todos body. `title` is optional at the serde level so a missing
/// field reaches the handler's presence check instead of failing
/// deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// PATCH /todos/{id} body. Absent fields leave the column untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// DELETE /todos/{id} confirmation body.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}
