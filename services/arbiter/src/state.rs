use std::sync::Arc;

use disputes::ReasoningProvider;
use sqlx::PgPool;

pub type SharedState = Arc<AppState>;

/// Shared application state. The provider is constructed once in `main`
/// and injected here; `None` means no reasoning endpoint is configured.
pub struct AppState {
    pub pg_pool: PgPool,
    pub provider: Option<Arc<dyn ReasoningProvider>>,
}

impl AppState {
    pub fn new(pg_pool: PgPool, provider: Option<Arc<dyn ReasoningProvider>>) -> Self {
        Self { pg_pool, provider }
    }
}
