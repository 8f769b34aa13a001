//! Next-occurrence calculation endpoint.

use chrono::Local;
use salvo::http::StatusCode;
use salvo::writing::Text;
use salvo::{Request, Response, Router, handler};

use planner_core::repeat::{next_occurrence, parse_date};

use super::render_error;

/// ## Summary
/// GET /api/nextdate - computes the next occurrence of a repeat rule.
///
/// Query parameters: `date` and `repeat` describe the task; `now` is the
/// reference date and defaults to today. The reply body is the bare
/// `YYYYMMDD` result, which the frontend consumes verbatim.
///
/// ## Errors
/// Returns 400 when the reference date, task date, or rule is malformed or
/// the rule can never match.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn next_date(req: &mut Request, res: &mut Response) {
    let date = req.query::<String>("date").unwrap_or_default();
    let repeat = req.query::<String>("repeat").unwrap_or_default();

    let now = match req.query::<String>("now") {
        Some(raw) if !raw.is_empty() => match parse_date(&raw) {
            Ok(now) => now,
            Err(e) => {
                tracing::debug!(error = %e, "Bad reference date");
                render_error(res, StatusCode::BAD_REQUEST, e.to_string());
                return;
            }
        },
        _ => Local::now().date_naive(),
    };

    match next_occurrence(now, &date, &repeat) {
        Ok(next) => res.render(Text::Plain(next)),
        Err(e) => {
            tracing::debug!(error = %e, "Next date calculation rejected");
            render_error(res, StatusCode::BAD_REQUEST, e.to_string());
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("nextdate").get(next_date)
}
