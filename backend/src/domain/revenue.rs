//! Revenue entry model and deterministic identifier derivation.
//!
//! Entries are content-addressed: the identifier is a pure function of the
//! owner's credential digest and the creation instant, not a sequence
//! counter. Two backends deriving the same triple always agree on the id.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// A single immutable ledger entry.
///
/// ## Invariants
/// - `id` equals [`derive_entry_id`] applied to the owning user's username,
///   stored password digest, and `timestamp`.
/// - `amount` is positive and finite.
/// - `timestamp` is an ISO-8601 instant with millisecond precision and a `Z`
///   suffix, produced from the server clock at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RevenueEntry {
    /// 64-character hex digest identifying the entry.
    #[schema(example = "3b1f...c9")]
    pub id: String,
    /// Owning user, associated by equality; no foreign key in the file store.
    pub username: String,
    /// Positive currency amount.
    #[schema(example = 42.5)]
    pub amount: f64,
    /// ISO-8601 creation instant.
    #[schema(example = "2026-08-07T12:34:56.789Z")]
    pub timestamp: String,
}

/// Derive the deterministic entry identifier.
///
/// Concatenates `username`, the server-held `password_hash`, and the ISO
/// timestamp string, then hex-encodes the SHA-256 digest. The digest input is
/// always the stored credential, never a cookie value.
pub fn derive_entry_id(username: &str, password_hash: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(password_hash.as_bytes());
    hasher.update(timestamp.as_bytes());
    hex::encode(hasher.finalize())
}

/// Render `instant` in the ledger's timestamp format.
///
/// Millisecond precision with a `Z` suffix, e.g. `2026-08-07T12:34:56.789Z`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current server clock rendered as a ledger timestamp.
pub fn current_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parse a stored timestamp for ordering.
///
/// Returns `None` for unparsable values so callers can order them after all
/// valid instants rather than failing the whole listing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    const USERNAME: &str = "alice";
    const HASH: &str = "9c87baa223f464954940f859bd136ce2795eee984c08cfa4c3db72548688e561";
    const TIMESTAMP: &str = "2026-08-07T12:34:56.789Z";

    #[rstest]
    fn identifier_is_deterministic() {
        let first = derive_entry_id(USERNAME, HASH, TIMESTAMP);
        let second = derive_entry_id(USERNAME, HASH, TIMESTAMP);
        assert_eq!(first, second);
    }

    #[rstest]
    fn identifier_is_hex_encoded_sha256() {
        let id = derive_entry_id(USERNAME, HASH, TIMESTAMP);
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case("bob", HASH, TIMESTAMP)]
    #[case(USERNAME, "another-digest", TIMESTAMP)]
    #[case(USERNAME, HASH, "2026-08-07T12:34:56.790Z")]
    fn perturbing_any_input_changes_the_identifier(
        #[case] username: &str,
        #[case] password_hash: &str,
        #[case] timestamp: &str,
    ) {
        let baseline = derive_entry_id(USERNAME, HASH, TIMESTAMP);
        let perturbed = derive_entry_id(username, password_hash, timestamp);
        assert_ne!(baseline, perturbed);
    }

    #[rstest]
    fn timestamps_render_with_millisecond_precision() {
        let instant = Utc
            .with_ymd_and_hms(2026, 8, 7, 12, 34, 56)
            .single()
            .expect("valid fixture instant");
        assert_eq!(format_timestamp(instant), "2026-08-07T12:34:56.000Z");
    }

    #[rstest]
    fn timestamps_round_trip_through_parsing() {
        let rendered = current_timestamp();
        let parsed = parse_timestamp(&rendered).expect("freshly rendered timestamp parses");
        assert_eq!(format_timestamp(parsed), rendered);
    }

    #[rstest]
    fn unparsable_timestamps_yield_none() {
        assert!(parse_timestamp("not-a-timestamp").is_none());
    }
}
