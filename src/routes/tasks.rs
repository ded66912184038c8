use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::{
    auth::OwnerScope,
    error::AppError,
    models::{TaskInput, TaskPatch},
    state::AppState,
};

/// The `{task_id}` segment under `/api/{user_id}/tasks`.
#[derive(Debug, Deserialize)]
pub struct TaskPath {
    pub task_id: i64,
}

// Every handler takes `OwnerScope` first: the token and path owner are
// checked before the body is read or the store is touched.

/// Lists the owner's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing, invalid or expired token.
/// - `404 Not Found`: the token belongs to a different user than `{user_id}`.
#[get("")]
pub async fn list_tasks(
    owner: OwnerScope,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(owner.owner_id()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task for the owner.
///
/// ## Request Body:
/// - `title`: required, non-blank, at most 200 characters (trimmed before storing).
/// - `description` (optional): at most 1000 characters.
///
/// ## Responses:
/// - `201 Created`: the new `Task`, with `completed` set to `false`.
/// - `422 Unprocessable Entity`: the body is malformed or fails validation.
#[post("")]
pub async fn create_task(
    owner: OwnerScope,
    state: web::Data<AppState>,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(owner.owner_id(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

#[get("/{task_id}")]
pub async fn get_task(
    owner: OwnerScope,
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(owner.owner_id(), path.task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Omitted fields keep their current value.
///
/// ## Request Body:
/// Any of `title`, `description`, `completed`.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task for this owner.
/// - `422 Unprocessable Entity`: a supplied field fails validation.
#[put("/{task_id}")]
pub async fn update_task(
    owner: OwnerScope,
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
    body: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(owner.owner_id(), path.task_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{task_id}")]
pub async fn delete_task(
    owner: OwnerScope,
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(owner.owner_id(), path.task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Flips the `completed` flag of a task.
#[patch("/{task_id}/complete")]
pub async fn toggle_task(
    owner: OwnerScope,
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .toggle_completion(owner.owner_id(), path.task_id)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}
