//! In-memory fixtures shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{LedgerStore, StoreError};
use crate::domain::revenue::{derive_entry_id, parse_timestamp};
use crate::domain::{RevenueEntry, User};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    revenues: Vec<RevenueEntry>,
}

/// Volatile [`LedgerStore`] used where persistence is not under test.
///
/// Mirrors the contract semantics of the real adapters: no uniqueness check
/// in `create_user`, owner lookup plus collision rejection in
/// `create_revenue`, and newest-first ordering in `revenues_for`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

fn lock_poisoned() -> StoreError {
    StoreError::query("memory store lock poisoned")
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().map_err(|_| lock_poisoned())?;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, StoreError> {
        let user = User {
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            salt: salt.to_owned(),
        };
        let mut state = self.state.lock().map_err(|_| lock_poisoned())?;
        state.users.push(user.clone());
        Ok(user)
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().map_err(|_| lock_poisoned())?;
        Ok(state.users.iter().any(|u| u.username == username))
    }

    async fn revenues_for(&self, username: &str) -> Result<Vec<RevenueEntry>, StoreError> {
        let state = self.state.lock().map_err(|_| lock_poisoned())?;
        let mut entries: Vec<RevenueEntry> = state
            .revenues
            .iter()
            .filter(|r| r.username == username)
            .cloned()
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
        let mut state = self.state.lock().map_err(|_| lock_poisoned())?;
        let password_hash = state
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
            .ok_or_else(|| StoreError::user_not_found(username))?;

        let id = derive_entry_id(username, &password_hash, timestamp);
        if state.revenues.iter().any(|r| r.id == id) {
            return Err(StoreError::duplicate_entry(id));
        }

        let entry = RevenueEntry {
            id,
            username: username.to_owned(),
            amount,
            timestamp: timestamp.to_owned(),
        };
        state.revenues.push(entry.clone());
        Ok(entry)
    }
}
