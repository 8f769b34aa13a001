use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::db::DbProvider;
use crate::error::{DbError, DbResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// ## Summary
/// Creates a new database connection pool and applies pending migrations.
///
/// The SQLite file is created on first use if it does not exist.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the provided database
/// URL or if a migration fails to apply.
#[tracing::instrument(skip(database_url), fields(pool_size = size))]
pub fn create_pool(database_url: &str, size: u32) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder().max_size(size).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    tracing::info!(
        pool_size = size,
        "Database connection pool created successfully"
    );

    Ok(pool)
}

/// ## Summary
/// Applies any pending embedded migrations.
///
/// ## Errors
/// Returns an error if a migration fails to apply.
pub fn run_migrations(conn: &mut SqliteConnection) -> DbResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    for version in applied {
        tracing::info!(%version, "Applied migration");
    }

    Ok(())
}

impl DbProvider for DbPool {
    #[tracing::instrument(skip(self))]
    fn get_connection(&self) -> DbResult<DbConnection> {
        Ok(self.get()?)
    }
}
