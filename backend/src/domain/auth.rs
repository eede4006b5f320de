//! Identity layer: password hashing, signup, and login.
//!
//! The digest is deliberately unsalted to stay compatible with stored
//! credentials and cookie-carried sessions; the `salt` column stays reserved
//! and empty. Login failures collapse into one generic outcome so responses
//! carry no user-enumeration signal.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::ports::LedgerStore;
use super::{Error, User};

/// Minimum username length accepted at signup.
pub const USERNAME_MIN: usize = 3;
/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 6;

/// One-way digest of a plaintext password, hex encoded.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn invalid_credentials() -> Error {
    Error::unauthorized("Invalid username or password")
}

/// Register a new account and return the created user.
///
/// Rejects short usernames and passwords, then duplicate usernames, before
/// storing the freshly computed digest with an empty salt.
pub async fn signup(store: &dyn LedgerStore, username: &str, password: &str) -> Result<User, Error> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::invalid_request("Username and password are required"));
    }
    if username.chars().count() < USERNAME_MIN {
        return Err(Error::invalid_request(format!(
            "Username must be at least {USERNAME_MIN} characters"
        )));
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(Error::invalid_request(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        )));
    }

    if store.user_exists(username).await? {
        return Err(Error::invalid_request("Username already exists"));
    }

    let user = store.create_user(username, &hash_password(password), "").await?;
    Ok(user)
}

/// Verify credentials and return the matching user.
///
/// An absent user and a wrong password both yield the identical
/// `Unauthorized` error.
pub async fn login(store: &dyn LedgerStore, username: &str, password: &str) -> Result<User, Error> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::invalid_request("Username and password are required"));
    }

    let Some(user) = store.get_user(username).await? else {
        debug!(username, "login for unknown user");
        return Err(invalid_credentials());
    };

    if user.password_hash != hash_password(password) {
        debug!(username, "login with mismatched password");
        return Err(invalid_credentials());
    }

    Ok(user)
}
