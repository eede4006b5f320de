//! SQLite ledger store over SQLx.
//!
//! A thin adapter translating between rows and domain types. Every statement
//! is parameterized through bind placeholders; nothing here builds SQL from
//! request strings. The lookup-then-insert pair in `create_revenue` is
//! deliberately not wrapped in a transaction: users are immutable, so the
//! owner row read cannot be invalidated between the two statements.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use crate::domain::ports::{LedgerStore, StoreError};
use crate::domain::revenue::derive_entry_id;
use crate::domain::{RevenueEntry, User};

const SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        password TEXT NOT NULL,
        salt TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS revenue (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        amount REAL NOT NULL,
        timestamp TEXT NOT NULL
    )",
];

/// Map SQLx failures to store errors, logging the engine detail.
fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) => {
            debug!(code = ?db.code(), message = db.message(), "sqlite operation failed");
        }
        other => debug!(error = %other, "sqlite operation failed"),
    }

    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::connection("database connection error")
        }
        _ => StoreError::query("database error"),
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        username: row.try_get("username").map_err(map_sqlx_error)?,
        password_hash: row.try_get("password").map_err(map_sqlx_error)?,
        salt: row.try_get("salt").map_err(map_sqlx_error)?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<RevenueEntry, StoreError> {
    Ok(RevenueEntry {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        username: row.try_get("username").map_err(map_sqlx_error)?,
        amount: row.try_get("amount").map_err(map_sqlx_error)?,
        timestamp: row.try_get("timestamp").map_err(map_sqlx_error)?,
    })
}

/// Relational [`LedgerStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` and apply the idempotent schema.
    ///
    /// The database file is created when missing, mirroring the file store's
    /// create-on-demand behaviour.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|error| StoreError::connection(error.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|error| StoreError::connection(error.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT username, password, salt FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, StoreError> {
        sqlx::query("INSERT INTO users (username, password, salt) VALUES (?1, ?2, ?3)")
            .bind(username)
            .bind(password_hash)
            .bind(salt)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(User {
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            salt: salt.to_owned(),
        })
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("count").map_err(map_sqlx_error)?;
        Ok(count > 0)
    }

    async fn revenues_for(&self, username: &str) -> Result<Vec<RevenueEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, username, amount, timestamp FROM revenue \
             WHERE username = ?1 ORDER BY timestamp DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn create_revenue(
        &self,
        username: &str,
        amount: f64,
        timestamp: &str,
    ) -> Result<RevenueEntry, StoreError> {
        let owner = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::user_not_found(username))?;

        let id = derive_entry_id(username, &owner.password_hash, timestamp);
        let insert =
            sqlx::query("INSERT INTO revenue (id, username, amount, timestamp) VALUES (?1, ?2, ?3, ?4)")
                .bind(&id)
                .bind(username)
                .bind(amount)
                .bind(timestamp)
                .execute(&self.pool)
                .await;

        match insert {
            Ok(_) => Ok(RevenueEntry {
                id,
                username: username.to_owned(),
                amount,
                timestamp: timestamp.to_owned(),
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::duplicate_entry(id))
            }
            Err(error) => Err(map_sqlx_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_store(dir: &TempDir) -> SqliteStore {
        let url = format!("sqlite:{}", dir.path().join("ledger.db").display());
        SqliteStore::connect(&url).await.expect("connect sqlite store")
    }

    #[tokio::test]
    async fn users_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;

        assert!(store.get_user("bob").await.expect("lookup").is_none());
        assert!(!store.user_exists("bob").await.expect("exists"));

        store
            .create_user("bob", "digest", "")
            .await
            .expect("create user");

        let user = store
            .get_user("bob")
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(user.username, "bob");
        assert_eq!(user.password_hash, "digest");
        assert_eq!(user.salt, "");
        assert!(store.user_exists("bob").await.expect("exists"));
    }

    #[tokio::test]
    async fn usernames_with_quote_characters_are_handled_verbatim() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;

        let hostile = "bob'; DROP TABLE users; --";
        store
            .create_user(hostile, "digest", "")
            .await
            .expect("create user");
        assert!(store.user_exists(hostile).await.expect("exists"));
        assert!(!store.user_exists("bob").await.expect("exists"));
    }

    #[tokio::test]
    async fn creating_revenue_for_an_unknown_user_fails() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;

        let error = store
            .create_revenue("nobody", 10.0, "2026-01-01T00:00:00.000Z")
            .await
            .expect_err("no owner row");
        assert_eq!(error, StoreError::user_not_found("nobody"));
        assert!(store.revenues_for("nobody").await.expect("entries").is_empty());
    }

    #[tokio::test]
    async fn the_engine_orders_entries_newest_first() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;
        store.create_user("alice", "digest", "").await.expect("user");

        for (amount, timestamp) in [
            (1.0, "2026-01-01T00:00:00.000Z"),
            (3.0, "2026-01-03T00:00:00.000Z"),
            (2.0, "2026-01-02T00:00:00.000Z"),
        ] {
            store
                .create_revenue("alice", amount, timestamp)
                .await
                .expect("create entry");
        }

        let entries = store.revenues_for("alice").await.expect("entries");
        let amounts: Vec<f64> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, [3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn a_colliding_identifier_is_rejected_not_replaced() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;
        store.create_user("alice", "digest", "").await.expect("user");

        let timestamp = "2026-01-01T00:00:00.000Z";
        let entry = store
            .create_revenue("alice", 1.0, timestamp)
            .await
            .expect("first entry");
        let error = store
            .create_revenue("alice", 2.0, timestamp)
            .await
            .expect_err("same instant must collide");
        assert_eq!(error, StoreError::duplicate_entry(entry.id.clone()));

        // The original entry survives untouched.
        let entries = store.revenues_for("alice").await.expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().map(|e| e.amount), Some(1.0));
    }

    #[tokio::test]
    async fn the_identifier_matches_the_derivation() {
        let dir = TempDir::new().expect("tempdir");
        let store = temp_store(&dir).await;
        store.create_user("alice", "digest", "").await.expect("user");

        let timestamp = "2026-01-01T00:00:00.000Z";
        let entry = store
            .create_revenue("alice", 1.0, timestamp)
            .await
            .expect("entry");
        assert_eq!(entry.id, derive_entry_id("alice", "digest", timestamp));
    }
}
