//! Task endpoints under `/users/{userId}/tasks`.
//!
//! Every route here sits behind `AuthMiddleware`, so by the time a handler runs the
//! caller's token subject equals `{userId}`. Handlers still compare the two and refuse
//! a mismatch, so a misconfigured scope fails closed.

use crate::{
    auth::AuthenticatedSubject,
    error::AppError,
    models::{Task, TaskInput},
    state::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct OwnerPath {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskPath {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "taskId")]
    pub task_id: String,
}

fn ensure_owner(subject: &AuthenticatedSubject, owner: &str) -> Result<(), AppError> {
    if subject.0 == owner {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden".into()))
    }
}

/// Lists every task owned by `{userId}`.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects, possibly empty.
/// - `401 Unauthorized` / `403 Forbidden`: rejected by the decision point.
/// - `500 Internal Server Error`: the store failed.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    path: web::Path<OwnerPath>,
    subject: AuthenticatedSubject,
) -> Result<impl Responder, AppError> {
    ensure_owner(&subject, &path.user_id)?;

    let tasks = state.tasks.scan_by_owner(&path.user_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by `{userId}`.
///
/// The owner comes from the path and the id is generated here; neither can be chosen
/// through the body.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: the body is not a task.
/// - `422 Unprocessable Entity`: field validation failed.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    path: web::Path<OwnerPath>,
    subject: AuthenticatedSubject,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    ensure_owner(&subject, &path.user_id)?;
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), &path.user_id);
    state.tasks.put(&task).await?;

    log::info!("user {} created task {}", task.user_id, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task.
///
/// Tasks owned by someone else are reported as missing.
#[get("/{taskId}")]
pub async fn get_task(
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
    subject: AuthenticatedSubject,
) -> Result<impl Responder, AppError> {
    ensure_owner(&subject, &path.user_id)?;

    match state.tasks.get_by_id(&path.task_id).await? {
        Some(task) if task.user_id == path.user_id => Ok(HttpResponse::Ok().json(task)),
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task owned by `{userId}`.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task for this owner.
#[delete("/{taskId}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    path: web::Path<TaskPath>,
    subject: AuthenticatedSubject,
) -> Result<impl Responder, AppError> {
    ensure_owner(&subject, &path.user_id)?;

    match state.tasks.get_by_id(&path.task_id).await? {
        Some(task) if task.user_id == path.user_id => {}
        _ => return Err(AppError::NotFound("Task not found".into())),
    }

    if !state.tasks.delete_by_id(&path.task_id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    log::info!("user {} deleted task {}", path.user_id, path.task_id);
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        let subject = AuthenticatedSubject("alice".into());
        assert!(ensure_owner(&subject, "alice").is_ok());
        assert!(matches!(
            ensure_owner(&subject, "bob"),
            Err(AppError::Forbidden(_))
        ));
    }
}
