//! File-backed ledger store.
//!
//! Holds the whole dataset as one in-memory document, lazily loaded on first
//! access and cached for the store's lifetime. Every mutation rewrites the
//! entire document. A single async mutex serialises load, mutation, and save
//! so concurrent requests cannot lose updates, and writes go through a
//! sibling temp file plus atomic rename so a crash mid-write cannot tear the
//! backing file.
//!
//! The on-disk layout is the pretty-printed document
//! `{ "revenues": [...], "users": [{username, password, salt}] }`. Legacy
//! files stored `revenues` as a mapping keyed by entry id; loading migrates
//! that shape to an array and rewrites the file once.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::{LedgerStore, StoreError};
use crate::domain::revenue::{derive_entry_id, parse_timestamp};
use crate::domain::{RevenueEntry, User};

/// Stored user row. The digest column is named `password` on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    username: String,
    #[serde(rename = "password")]
    password_hash: String,
    #[serde(default)]
    salt: String,
}

impl StoredUser {
    fn to_domain(&self) -> User {
        User {
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
            salt: self.salt.clone(),
        }
    }
}

/// Stored revenue row. Entries migrated from the legacy single-entry-per-user
/// mapping may lack a `username` field; those default to empty and stay
/// unowned.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRevenue {
    id: String,
    #[serde(default)]
    username: String,
    amount: f64,
    timestamp: String,
}

impl StoredRevenue {
    fn to_domain(&self) -> RevenueEntry {
        RevenueEntry {
            id: self.id.clone(),
            username: self.username.clone(),
            amount: self.amount,
            timestamp: self.timestamp.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerDocument {
    revenues: Vec<StoredRevenue>,
    users: Vec<StoredUser>,
}

/// Normalise a raw document value into the current shape.
///
/// Returns the typed document and whether the shape changed, so callers can
/// rewrite migrated files exactly once and leave current files untouched.
fn migrate_document(raw: Value) -> Result<(LedgerDocument, bool), StoreError> {
    let Value::Object(mut map) = raw else {
        return Ok((LedgerDocument::default(), true));
    };

    let mut migrated = false;
    match map.get_mut("revenues") {
        Some(Value::Array(_)) => {}
        Some(Value::Object(entries)) => {
            let values: Vec<Value> = entries.values().cloned().collect();
            map.insert("revenues".to_owned(), Value::Array(values));
            migrated = true;
        }
        _ => {
            map.insert("revenues".to_owned(), Value::Array(Vec::new()));
            migrated = true;
        }
    }
    if !matches!(map.get("users"), Some(Value::Array(_))) {
        map.insert("users".to_owned(), Value::Array(Vec::new()));
        migrated = true;
    }

    let document = serde_json::from_value(Value::Object(map))
        .map_err(|error| StoreError::serialization(error.to_string()))?;
    Ok((document, migrated))
}

/// Durable single-file [`LedgerStore`].
///
/// Constructed explicitly with its backing path; the caller owns the
/// instance and its lifetime, so tests and deployments can isolate stores
/// without process-wide state.
pub struct JsonStore {
    data_path: PathBuf,
    document: Mutex<Option<LedgerDocument>>,
}

impl JsonStore {
    /// Create a store over `data_path`. No I/O happens until first access.
    pub fn open(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            document: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    pub fn data_path(&self) -> &Path {
        self.data_path.as_path()
    }

    async fn load_from_disk(&self) -> Result<LedgerDocument, StoreError> {
        let raw = match fs::read(&self.data_path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %self.data_path.display(), %error, "initialising empty ledger file");
                let document = LedgerDocument::default();
                self.persist(&document).await?;
                return Ok(document);
            }
        };

        let value: Value = match serde_json::from_slice(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(path = %self.data_path.display(), %error, "ledger file unparsable, starting fresh");
                let document = LedgerDocument::default();
                self.persist(&document).await?;
                return Ok(document);
            }
        };

        let (document, migrated) = migrate_document(value)?;
        if migrated {
            debug!(path = %self.data_path.display(), "rewriting ledger file in migrated shape");
            self.persist(&document).await?;
        }
        Ok(document)
    }

    async fn ensure_loaded<'a>(
        &self,
        slot: &'a mut Option<LedgerDocument>,
    ) -> Result<&'a mut LedgerDocument, StoreError> {
        if slot.is_none() {
            *slot = Some(self.load_from_disk().await?);
        }
        Ok(slot.get_or_insert_with(LedgerDocument::default))
    }

    async fn persist(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        if let Some(dir) = self.data_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .map_err(|error| StoreError::io(error.to_string()))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|error| StoreError::serialization(error.to_string()))?;

        let mut temp_path = self.data_path.as_os_str().to_owned();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        fs::write(&temp_path, &bytes)
            .await
            .map_err(|error| StoreError::io(error.to_string()))?;
        fs::rename(&temp_path, &self.data_path)
            .await
            .map_err(|error| StoreError::io(error.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for JsonStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut slot = self.document.lock().await;
        let document = self.ensure_loaded(&mut slot).await?;
        Ok(document
            .users
            .iter()
            .find(|u| u.username == username)
            .map(StoredUser::to_domain))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, StoreError> {
        let mut slot = self.document.lock().await;
        let document = self.ensure_loaded(&mut slot).await?;
        let row = StoredUser {
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            salt: salt.to_owned(),
        };
        let user = row.to_domain();
        document.users.push(row);
        self.persist(document).await?;
        Ok(user)
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let mut slot = self.document.lock().await;
        let document = self.ensure_loaded(&mut slot).await?;
        Ok(document.users.iter().any(|u| u.username == username))
    }

    async fn revenues_for(&self, username: &str) -> Result<Vec<RevenueEntry>, StoreError> {
        let mut slot = self.document.lock().await;
        let document = self.ensure_loaded(&mut slot).await?;
        let mut entries: Vec<RevenueEntry> = document
            .revenues
            .iter()
            .filter(|r| r.username == username)
            .map(StoredRevenue::to_domain)
            .collect();
        entries.sort_by(|a, b| parse_timestamp(&b.timestamp).cmp(&parse_timestamp(&a.timestamp)));
        Ok(entries)
    }

    async fn create_revenue(
        &self,
        username: &str,
        amount: f64,
        timestamp: &str,
    ) -> Result<RevenueEntry, StoreError> {
        let mut slot = self.document.lock().await;
        let document = self.ensure_loaded(&mut slot).await?;

        let password_hash = document
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
            .ok_or_else(|| StoreError::user_not_found(username))?;

        let id = derive_entry_id(username, &password_hash, timestamp);
        if document.revenues.iter().any(|r| r.id == id) {
            return Err(StoreError::duplicate_entry(id));
        }

        let row = StoredRevenue {
            id,
            username: username.to_owned(),
            amount,
            timestamp: timestamp.to_owned(),
        };
        let entry = row.to_domain();
        document.revenues.push(row);
        self.persist(document).await?;
        Ok(entry)
    }
}
