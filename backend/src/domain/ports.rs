//! Storage port for the revenue ledger.
//!
//! The [`LedgerStore`] trait is the contract every backend implements,
//! independent of physical storage. Adapters map their failures into
//! [`StoreError`] variants instead of returning opaque errors.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::{RevenueEntry, User};

/// Errors surfaced by ledger store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store connectivity failures (pool checkout, engine unreachable).
    #[error("ledger store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("ledger store query failed: {message}")]
    Query { message: String },
    /// Reading or writing the backing file failed.
    #[error("ledger store I/O failed: {message}")]
    Io { message: String },
    /// The stored document could not be serialised or deserialised.
    #[error("ledger document serialisation failed: {message}")]
    Serialization { message: String },
    /// The operation references a user that does not exist.
    #[error("no user named {username}")]
    UserNotFound { username: String },
    /// An entry with the same derived identifier already exists.
    #[error("revenue entry {id} already exists")]
    DuplicateEntry { id: String },
}

impl StoreError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for file I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Helper for serialisation failures.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Helper for missing-owner failures.
    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::UserNotFound {
            username: username.into(),
        }
    }

    /// Helper for identifier collisions.
    pub fn duplicate_entry(id: impl Into<String>) -> Self {
        Self::DuplicateEntry { id: id.into() }
    }
}

/// Shared handle to a ledger store implementation.
pub type SharedStore = Arc<dyn LedgerStore>;

/// Operations every ledger backend must provide.
///
/// # Contract
///
/// - `create_user` performs no uniqueness check; callers run [`user_exists`]
///   first. The check-then-insert pair is not atomic.
/// - `revenues_for` returns entries ordered by timestamp descending and an
///   empty vector, not an error, when the user has none.
/// - `create_revenue` derives the entry id from the stored owner credential
///   and fails with [`StoreError::UserNotFound`] when no owner row exists,
///   and with [`StoreError::DuplicateEntry`] when the derived id collides
///   with an existing entry. It never creates a partial record.
///
/// [`user_exists`]: LedgerStore::user_exists
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch a user by username, `None` when absent.
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user record.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, StoreError>;

    /// Whether a user record exists for `username`.
    async fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// All entries owned by `username`, newest first.
    async fn revenues_for(&self, username: &str) -> Result<Vec<RevenueEntry>, StoreError>;

    /// Append a new ledger entry for `username`.
    async fn create_revenue(
        &self,
        username: &str,
        amount: f64,
        timestamp: &str,
    ) -> Result<RevenueEntry, StoreError>;
}
