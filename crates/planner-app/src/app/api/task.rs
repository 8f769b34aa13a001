//! CRUD handlers for individual tasks.

use chrono::{Local, NaiveDate};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Serialize};

use planner_core::repeat::{format_date, next_occurrence, parse_date};
use planner_db::db::query::task as task_query;
use planner_db::error::DbError;
use planner_db::model::task::{NewTask, Task};

use super::{connection_from_depot, render_empty, render_error, required_id};

/// Task payload for create and update requests. Every field arrives as a
/// string; absent fields default to empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskPayload {
    pub id: String,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

/// Task representation returned to clients; every field is a string,
/// including the id.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            date: task.date,
            title: task.title,
            comment: task.comment,
            repeat: task.repeat,
        }
    }
}

/// Created-task reply.
#[derive(Debug, Serialize)]
struct CreatedResponse {
    id: i32,
}

/// ## Summary
/// Validates a task payload and normalizes its date relative to `today`.
///
/// An empty date on a new task defaults to today. A past date moves to today
/// for non-repeating tasks and to the rule's next occurrence for repeating
/// ones; a future date is left alone, and its rule is not evaluated.
///
/// ## Errors
/// Returns a message describing the rejected field.
pub(crate) fn validate_payload(payload: &mut TaskPayload, today: NaiveDate) -> Result<(), String> {
    if payload.title.is_empty() {
        return Err("task title is required".to_string());
    }

    if payload.id.is_empty() && payload.date.is_empty() {
        payload.date = format_date(today);
    }
    if payload.date.is_empty() {
        return Ok(());
    }

    let date = parse_date(&payload.date).map_err(|e| e.to_string())?;

    if date < today {
        if payload.repeat.is_empty() {
            payload.date = format_date(today);
        } else {
            payload.date = next_occurrence(today, &payload.date, &payload.repeat)
                .map_err(|e| format!("failed to calculate next date: {e}"))?;
        }
    }

    Ok(())
}

async fn parse_payload(req: &mut Request, res: &mut Response) -> Option<TaskPayload> {
    let mut payload: TaskPayload = match req.parse_json().await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to parse task payload");
            render_error(res, StatusCode::BAD_REQUEST, format!("invalid JSON: {e}"));
            return None;
        }
    };

    if let Err(message) = validate_payload(&mut payload, Local::now().date_naive()) {
        render_error(res, StatusCode::BAD_REQUEST, message);
        return None;
    }

    Some(payload)
}

/// ## Summary
/// POST /api/task - creates a task.
///
/// ## Errors
/// Returns 400 for invalid JSON, a missing title, or a malformed date or
/// rule. Replies 201 with `{"id": n}` on success.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn add_task(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(payload) = parse_payload(req, res).await else {
        return;
    };
    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    let new = NewTask {
        date: &payload.date,
        title: &payload.title,
        comment: &payload.comment,
        repeat: &payload.repeat,
    };

    match task_query::insert_task(&mut conn, &new) {
        Ok(id) => {
            tracing::info!(id, "Task created");
            res.status_code(StatusCode::CREATED);
            res.render(Json(CreatedResponse { id }));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add task");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to add task: {e}"),
            );
        }
    }
}

/// ## Summary
/// GET /api/task?id= - fetches a single task.
///
/// ## Errors
/// Returns 400 for a missing, malformed, or unknown id.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn get_task(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = required_id(req, res) else {
        return;
    };
    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    match task_query::task_by_id(&mut conn, id) {
        Ok(task) => res.render(Json(TaskResponse::from(task))),
        Err(e @ DbError::TaskNotFound(_)) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to get task: {e}"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get task");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    }
}

/// ## Summary
/// PUT /api/task - overwrites an existing task.
///
/// The payload goes through the same validation and date normalization as
/// task creation.
///
/// ## Errors
/// Returns 400 for invalid JSON, a failed validation, or an unknown id.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn update_task(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(payload) = parse_payload(req, res).await else {
        return;
    };

    let id = match payload.id.parse() {
        Ok(id) => id,
        Err(_) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("invalid task id: {}", payload.id),
            );
            return;
        }
    };

    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    let task = Task {
        id,
        date: payload.date,
        title: payload.title,
        comment: payload.comment,
        repeat: payload.repeat,
    };

    match task_query::update_task(&mut conn, &task) {
        Ok(()) => render_empty(res),
        Err(e @ DbError::TaskNotFound(_)) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to update task: {e}"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update task");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    }
}

/// ## Summary
/// DELETE /api/task?id= - deletes a task.
///
/// ## Errors
/// Returns 400 for a missing, malformed, or unknown id.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn delete_task(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = required_id(req, res) else {
        return;
    };
    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    match task_query::delete_task(&mut conn, id) {
        Ok(()) => {
            tracing::info!(id, "Task deleted");
            render_empty(res);
        }
        Err(e @ DbError::TaskNotFound(_)) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to delete task: {e}"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete task");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("task")
        .post(add_task)
        .get(get_task)
        .put(update_task)
        .delete(delete_task)
}
