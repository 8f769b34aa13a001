use crate::error::DbResult;

pub mod connection;
pub mod query;
pub mod schema;

/// Storage handle handed to request handlers instead of ambient global state.
pub trait DbProvider: Send + Sync {
    /// ## Summary
    /// Checks a connection out of the pool.
    ///
    /// ## Errors
    /// Returns an error if no connection can be acquired.
    fn get_connection(&self) -> DbResult<connection::DbConnection>;
}
