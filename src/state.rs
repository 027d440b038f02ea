//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{config::Config, db::DbPool};

/// Cloneable handle on the connection pool and configuration.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
