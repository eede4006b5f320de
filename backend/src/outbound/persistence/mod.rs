//! Ledger store adapters and startup selection.
//!
//! Two interchangeable [`LedgerStore`] implementations live here:
//!
//! - [`SqliteStore`]: parameterized statements over a SQLite pool.
//! - [`JsonStore`]: whole-document JSON persistence with legacy-schema
//!   migration, for development and tests.
//!
//! Selection happens once at startup from explicit configuration rather
//! than call-time environment probing. A production deployment without a
//! bound database is a misconfiguration and fails store acquisition rather
//! than silently degrading onto the file store.
//!
//! [`LedgerStore`]: crate::domain::ports::LedgerStore

mod json;
mod sqlite;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, DeploymentMode};
use crate::domain::ports::{SharedStore, StoreError};

pub use json::JsonStore;
pub use sqlite::SqliteStore;

/// Errors raised while acquiring the ledger store at startup.
#[derive(Debug, Error)]
pub enum SelectStoreError {
    /// Production mode was configured without a bound database.
    #[error("production deployment requires a database url")]
    MissingDatabase,
    /// The configured relational store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve the configured ledger store.
///
/// A bound `database_url` always wins. Otherwise development and test
/// deployments fall back to the file store at `data_path`; production fails
/// fast with [`SelectStoreError::MissingDatabase`].
pub async fn select_store(config: &AppConfig) -> Result<SharedStore, SelectStoreError> {
    if let Some(url) = config.database_url.as_deref() {
        let store = SqliteStore::connect(url).await?;
        info!("using relational ledger store");
        return Ok(Arc::new(store));
    }

    if config.mode == DeploymentMode::Production {
        return Err(SelectStoreError::MissingDatabase);
    }

    info!(path = %config.data_path.display(), "using file ledger store");
    Ok(Arc::new(JsonStore::open(config.data_path.clone())))
}
