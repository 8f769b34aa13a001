use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    DatabaseError(#[from] planner_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] planner_core::error::CoreError),

    #[error(transparent)]
    RepeatError(#[from] planner_core::repeat::RepeatError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
