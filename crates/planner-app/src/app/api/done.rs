//! Task completion endpoint.

use chrono::{Local, NaiveDate};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};

use planner_core::repeat::next_occurrence;
use planner_db::db::connection::DbConnection;
use planner_db::db::query::task as task_query;
use planner_db::error::DbError;

use crate::error::{AppError, AppResult};

use super::{connection_from_depot, render_empty, render_error, required_id};

/// ## Summary
/// POST /api/task/done?id= - marks a task complete.
///
/// A task without a repeat rule is deleted; a repeating task has its due
/// date advanced to the rule's next occurrence after today.
///
/// ## Errors
/// Returns 400 for a missing or unknown id and for rules that fail to
/// evaluate, 500 for storage faults.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn complete_task(req: &mut Request, depot: &Depot, res: &mut Response) {
    let Some(id) = required_id(req, res) else {
        return;
    };
    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    match complete(&mut conn, id, Local::now().date_naive()) {
        Ok(()) => {
            tracing::info!(id, "Task completed");
            render_empty(res);
        }
        Err(AppError::DatabaseError(e @ DbError::TaskNotFound(_))) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to complete task: {e}"),
            );
        }
        Err(AppError::RepeatError(e)) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("failed to calculate next date: {e}"),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to complete task");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    }
}

fn complete(conn: &mut DbConnection, id: i32, today: NaiveDate) -> AppResult<()> {
    let task = task_query::task_by_id(conn, id)?;

    if task.repeat.is_empty() {
        task_query::delete_task(conn, id)?;
    } else {
        let next = next_occurrence(today, &task.date, &task.repeat)?;
        task_query::update_date(conn, id, &next)?;
    }

    Ok(())
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("task/done").post(complete_task)
}
