//! Task list and search endpoint.

use chrono::NaiveDate;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Serialize;

use planner_db::db::query::task as task_query;

use super::task::TaskResponse;
use super::{connection_from_depot, render_error};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// Search input in this format filters by exact date instead of text.
const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Serialize)]
struct TaskListResponse {
    tasks: Vec<TaskResponse>,
}

/// ## Summary
/// GET /api/tasks - lists upcoming tasks.
///
/// With no `search` parameter the most recent tasks are returned. A `search`
/// value in `DD.MM.YYYY` form filters by exact due date; anything else is a
/// substring match over title and comment. `limit` defaults to 50 and is
/// clamped to 100; unparseable values fall back to the default.
///
/// ## Errors
/// Returns 500 if the storage query fails.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn list_tasks(req: &mut Request, depot: &Depot, res: &mut Response) {
    let search = req.query::<String>("search").unwrap_or_default();
    let limit = parse_limit(req.query::<String>("limit").as_deref());

    let Some(mut conn) = connection_from_depot(depot, res) else {
        return;
    };

    let result = if search.is_empty() {
        task_query::recent_tasks(&mut conn, limit)
    } else if let Ok(date) = NaiveDate::parse_from_str(&search, SEARCH_DATE_FORMAT) {
        task_query::tasks_by_date(&mut conn, date, limit)
    } else {
        task_query::search_tasks(&mut conn, &search, limit)
    };

    match result {
        Ok(tasks) => {
            let tasks = tasks.into_iter().map(TaskResponse::from).collect();
            res.render(Json(TaskListResponse { tasks }));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list tasks");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    }
}

/// Invalid or non-positive limits fall back to the default rather than
/// failing the request.
pub(crate) fn parse_limit(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_LIMIT;
    };

    match raw.parse::<i64>() {
        Ok(limit) if limit > 0 => limit.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("tasks").get(list_tasks)
}
