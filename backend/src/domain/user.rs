//! User data model.

/// Application user as held by the ledger stores.
///
/// ## Invariants
/// - `username` is unique across the store and immutable once created.
/// - `password_hash` is the lowercase hex SHA-256 digest of the plaintext
///   password. The digest is unsalted; `salt` is a reserved column kept for
///   schema compatibility and is stored as the empty string.
///
/// Users are created once at signup and never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique, case-sensitive account name.
    pub username: String,
    /// Hex SHA-256 digest of the plaintext password.
    pub password_hash: String,
    /// Reserved field, not folded into the digest.
    pub salt: String,
}
