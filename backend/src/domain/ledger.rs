//! Ledger use-cases: recording entries and listing history.

use tracing::debug;

use super::ports::LedgerStore;
use super::revenue::{RevenueEntry, current_timestamp};
use super::{Error, ErrorCode};

/// Validate a submitted amount.
///
/// Missing, non-positive, and non-finite values are all rejected with the
/// same message the boundary returns for a malformed submission.
pub fn validate_amount(amount: Option<f64>) -> Result<f64, Error> {
    match amount {
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(Error::invalid_request("Invalid amount")),
    }
}

/// Record a new revenue entry for `username` at the current server instant.
///
/// The entry id is derived inside the store from the owner's stored
/// credential digest and the timestamp chosen here.
pub async fn record(
    store: &dyn LedgerStore,
    username: &str,
    amount: Option<f64>,
) -> Result<RevenueEntry, Error> {
    let amount = validate_amount(amount)?;
    let timestamp = current_timestamp();
    let entry = store.create_revenue(username, amount, &timestamp).await?;
    debug!(username, id = %entry.id, "revenue entry recorded");
    Ok(entry)
}

/// All entries owned by `username`, newest first.
pub async fn history(store: &dyn LedgerStore, username: &str) -> Result<Vec<RevenueEntry>, Error> {
    Ok(store.revenues_for(username).await?)
}

/// Map storage failures into the domain error taxonomy.
///
/// A missing owner surfaces as `NotFound` and an id collision as `Conflict`;
/// everything else is internal and redacted at the boundary.
impl From<super::ports::StoreError> for Error {
    fn from(error: super::ports::StoreError) -> Self {
        use super::ports::StoreError;
        match error {
            StoreError::UserNotFound { .. } => Self::new(ErrorCode::NotFound, "User not found"),
            StoreError::DuplicateEntry { .. } => Self::new(
                ErrorCode::Conflict,
                "A revenue entry already exists for this instant",
            ),
            other => Self::internal(other.to_string()),
        }
    }
}
