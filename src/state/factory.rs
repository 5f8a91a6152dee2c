use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{InMemoryStore, IssueStore, SledStore};
use std::sync::Arc;

/// Create an issue store from configuration
pub fn create_store(config: &StateConfig) -> Result<Arc<dyn IssueStore>> {
    match config.backend {
        StateBackend::Memory => {
            tracing::info!("Using in-memory issue store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StateBackend::Sled => {
            let path = config.path.clone().ok_or_else(|| {
                AppError::Configuration("state.path is required for the sled backend".to_string())
            })?;
            Ok(Arc::new(SledStore::new(path)?))
        }
    }
}
