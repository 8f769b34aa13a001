//! Keyed queries over the scheduler table.

use chrono::NaiveDate;
use diesel::prelude::*;

use planner_core::repeat::format_date;

use crate::db::schema::scheduler;
use crate::error::{DbError, DbResult};
use crate::model::task::{NewTask, Task};

/// ## Summary
/// Inserts a new task and returns its assigned id.
///
/// ## Errors
/// Returns an error if the insert fails.
pub fn insert_task(conn: &mut SqliteConnection, new: &NewTask<'_>) -> DbResult<i32> {
    let id = diesel::insert_into(scheduler::table)
        .values(new)
        .returning(scheduler::id)
        .get_result(conn)?;

    Ok(id)
}

/// ## Summary
/// Fetches a single task by id.
///
/// ## Errors
/// Returns `DbError::TaskNotFound` if no row has that id.
pub fn task_by_id(conn: &mut SqliteConnection, id: i32) -> DbResult<Task> {
    scheduler::table
        .find(id)
        .select(Task::as_select())
        .first(conn)
        .optional()?
        .ok_or(DbError::TaskNotFound(id))
}

/// ## Summary
/// Overwrites every field of an existing task.
///
/// ## Errors
/// Returns `DbError::TaskNotFound` if no row has the task's id.
pub fn update_task(conn: &mut SqliteConnection, task: &Task) -> DbResult<()> {
    let affected = diesel::update(scheduler::table.find(task.id))
        .set(task)
        .execute(conn)?;

    ensure_found(affected, task.id)
}

/// ## Summary
/// Moves a task to a new due date, leaving the other fields alone.
///
/// ## Errors
/// Returns `DbError::TaskNotFound` if no row has that id.
pub fn update_date(conn: &mut SqliteConnection, id: i32, date: &str) -> DbResult<()> {
    let affected = diesel::update(scheduler::table.find(id))
        .set(scheduler::date.eq(date))
        .execute(conn)?;

    ensure_found(affected, id)
}

/// ## Summary
/// Deletes a task by id.
///
/// ## Errors
/// Returns `DbError::TaskNotFound` if no row has that id.
pub fn delete_task(conn: &mut SqliteConnection, id: i32) -> DbResult<()> {
    let affected = diesel::delete(scheduler::table.find(id)).execute(conn)?;

    ensure_found(affected, id)
}

/// ## Summary
/// Lists tasks ordered by due date, most recent first.
///
/// ## Errors
/// Returns an error if the query fails.
pub fn recent_tasks(conn: &mut SqliteConnection, limit: i64) -> DbResult<Vec<Task>> {
    Ok(scheduler::table
        .order(scheduler::date.desc())
        .limit(limit)
        .select(Task::as_select())
        .load(conn)?)
}

/// ## Summary
/// Substring search over title and comment, ordered by due date ascending.
///
/// ## Errors
/// Returns an error if the query fails.
pub fn search_tasks(conn: &mut SqliteConnection, text: &str, limit: i64) -> DbResult<Vec<Task>> {
    let pattern = format!("%{text}%");

    Ok(scheduler::table
        .filter(
            scheduler::title
                .like(pattern.clone())
                .or(scheduler::comment.like(pattern)),
        )
        .order(scheduler::date.asc())
        .limit(limit)
        .select(Task::as_select())
        .load(conn)?)
}

/// ## Summary
/// Lists tasks due on an exact date.
///
/// ## Errors
/// Returns an error if the query fails.
pub fn tasks_by_date(conn: &mut SqliteConnection, date: NaiveDate, limit: i64) -> DbResult<Vec<Task>> {
    Ok(scheduler::table
        .filter(scheduler::date.eq(format_date(date)))
        .limit(limit)
        .select(Task::as_select())
        .load(conn)?)
}

fn ensure_found(affected: usize, id: i32) -> DbResult<()> {
    if affected == 0 {
        return Err(DbError::TaskNotFound(id));
    }
    Ok(())
}
