use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use planner_core::error::CoreError;
use planner_db::db::DbProvider;
use planner_db::db::connection::DbPool;

/// Middleware that exposes the connection pool to downstream handlers.
pub struct DbProviderHandler {
    pub provider: DbPool,
}

#[async_trait]
impl salvo::Handler for DbProviderHandler {
    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        // Handlers only see the provider trait, not the pool itself.
        let provider: Arc<dyn DbProvider + Send + Sync> = Arc::new(self.provider.clone());
        depot.inject(provider);
    }
}

/// ## Summary
/// Retrieves the database provider from the depot.
///
/// ## Errors
/// Returns an error if the database provider is not found in the depot.
pub fn get_db_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Arc<dyn DbProvider + Send + Sync + 'static>> {
    depot
        .obtain::<Arc<dyn DbProvider + Send + Sync>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Database provider not found in depot").into()
        })
}
