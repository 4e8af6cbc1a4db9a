use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{CreateTodoRequest, DeleteResponse, Todo, UpdateTodoRequest};
use crate::AppState;

/// Path ids are taken as strings and parsed by hand: a non-numeric id
/// behaves as a lookup that matches nothing, not as a client error.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// `Json` extractor that reports body problems through [`ApiError`], so a
/// malformed or type-invalid body gets a 400 with a JSON error body instead
/// of axum's plain-text 422.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    status: &'static str,
}

pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.db.list_todos()?))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.db.get_todo(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(todo))
}

pub async fn create_todo(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;

    let todo = state.db.insert_todo(title)?;
    tracing::info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;

    // A blank title counts as absent, mirroring the create-side presence check.
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if title.is_none() && input.completed.is_none() {
        return Err(ApiError::BadRequest(
            "At least one of 'title' or 'completed' is required".to_string(),
        ));
    }

    let todo = state
        .db
        .update_todo(id, title, input.completed)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !state.db.delete_todo(id)? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id, "todo deleted");
    Ok(Json(DeleteResponse {
        message: "Todo deleted",
    }))
}
