use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::Serialize;

use crate::db::schema;

/// A scheduled task row. `date` is a canonical `YYYYMMDD` string and
/// `repeat` holds the recurrence rule, empty for one-shot tasks.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, AsChangeset, Serialize,
)]
#[diesel(table_name = schema::scheduler)]
#[diesel(check_for_backend(Sqlite))]
pub struct Task {
    pub id: i32,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

/// Insert struct for creating new tasks
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::scheduler)]
pub struct NewTask<'a> {
    pub date: &'a str,
    pub title: &'a str,
    pub comment: &'a str,
    pub repeat: &'a str,
}
