//! Per-user revenue ledger backend.
//!
//! Users authenticate, submit monetary amounts, and retrieve their history.
//! The domain layer owns the entities, the identity logic, and the storage
//! port; inbound adapters expose the HTTP surface; outbound adapters
//! implement the port over SQLite or a single JSON file.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::AuthRedirect;
