//! # Scan Policy
//!
//! Address filtering and the block-age cutoff applied by the scan consumer.

use super::entities::{Block, Transaction};

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Age threshold below which blocks stop the scan.
///
/// A block whose timestamp is strictly earlier than the cutoff is "too old".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCutoff {
    /// Unix timestamp (seconds) of the oldest acceptable block.
    pub oldest_allowed: u64,
}

impl AgeCutoff {
    /// Build the cutoff for `day_limit` days before `now` (Unix seconds).
    ///
    /// A zero day limit disables the cutoff.
    pub fn from_day_limit(day_limit: u64, now: u64) -> Option<Self> {
        if day_limit == 0 {
            return None;
        }
        let window = day_limit.saturating_mul(SECONDS_PER_DAY);
        Some(Self {
            oldest_allowed: now.saturating_sub(window),
        })
    }

    /// Whether a block with `timestamp` is older than the cutoff.
    pub fn is_expired(&self, timestamp: u64) -> bool {
        timestamp < self.oldest_allowed
    }
}

/// Transactions in `block` whose sender or recipient equals `address`,
/// in source order.
pub fn matching_transactions(block: Block, address: &str) -> Vec<Transaction> {
    block
        .into_full_transactions()
        .into_iter()
        .filter(|tx| tx.touches(address))
        .collect()
}
