use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel::r2d2::PoolError),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Task not found: id {0}")]
    TaskNotFound(i32),

    #[error(transparent)]
    CoreError(#[from] planner_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
