// Task scheduler API handlers.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router};
use serde::Serialize;
use serde_json::json;

use crate::db_handler::get_db_from_depot;
use planner_db::db::connection::DbConnection;

pub mod done;
pub mod nextdate;
pub mod task;
mod task_tests;
pub mod tasks;

/// ## Summary
/// Constructs the `/api` router with every task scheduler endpoint.
#[must_use]
pub fn routes() -> Router {
    Router::with_path("api")
        .push(nextdate::routes())
        .push(done::routes())
        .push(task::routes())
        .push(tasks::routes())
}

/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn render_error(res: &mut Response, status: StatusCode, message: impl Into<String>) {
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error: message.into(),
    }));
}

/// Empty-object success reply.
pub(crate) fn render_empty(res: &mut Response) {
    res.render(Json(json!({})));
}

/// Pulls the `id` query parameter, rejecting missing or non-numeric values
/// with a 400 before any storage work happens.
pub(crate) fn required_id(req: &Request, res: &mut Response) -> Option<i32> {
    let raw = req.query::<String>("id").unwrap_or_default();
    if raw.is_empty() {
        render_error(res, StatusCode::BAD_REQUEST, "task id is required");
        return None;
    }

    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                format!("invalid task id: {raw}"),
            );
            None
        }
    }
}

/// Checks a connection out of the depot-injected pool, rendering a 500 and
/// returning `None` when the storage layer is unavailable.
pub(crate) fn connection_from_depot(depot: &Depot, res: &mut Response) -> Option<DbConnection> {
    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            return None;
        }
    };

    match provider.get_connection() {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            None
        }
    }
}
