//! # Value Objects
//!
//! Small immutable types shared by the scan pipeline: block numbers, chunks,
//! hex quantities and scan identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Block height on the remote chain.
pub type BlockNumber = u64;

/// A contiguous, closed range of block numbers fetched in one batch call.
///
/// Iteration yields the block numbers in ascending order, which is also the
/// order of the items inside the batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// Lowest block number in the chunk (inclusive).
    pub start: BlockNumber,
    /// Highest block number in the chunk (inclusive).
    pub end: BlockNumber,
}

impl Chunk {
    /// Create a chunk covering `[start, end]`.
    pub fn new(start: BlockNumber, end: BlockNumber) -> Self {
        debug_assert!(start <= end, "chunk bounds inverted");
        Self { start, end }
    }

    /// Number of block numbers in the chunk.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A chunk always holds at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Block numbers in ascending order.
    pub fn iter(&self) -> std::ops::RangeInclusive<BlockNumber> {
        self.start..=self.end
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl IntoIterator for Chunk {
    type Item = BlockNumber;
    type IntoIter = std::ops::RangeInclusive<BlockNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Error decoding a JSON-RPC hex quantity such as `"0x1b4"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexQuantityError {
    #[error("missing 0x prefix in {0:?}")]
    MissingPrefix(String),

    #[error("empty hex quantity")]
    Empty,

    #[error("invalid hex quantity {value:?}: {reason}")]
    Invalid { value: String, reason: String },
}

/// Decode a `0x`-prefixed hex quantity into a `u64`.
pub fn parse_hex_quantity(value: &str) -> Result<u64, HexQuantityError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HexQuantityError::MissingPrefix(value.to_string()))?;

    if digits.is_empty() {
        return Err(HexQuantityError::Empty);
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexQuantityError::Invalid {
            value: value.to_string(),
            reason: format!("invalid digit {bad:?}"),
        });
    }

    u64::from_str_radix(digits, 16).map_err(|e| HexQuantityError::Invalid {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a number as a JSON-RPC hex quantity (no leading zeros).
pub fn to_hex_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Identifier attached to one scan invocation for log correlation.
///
/// Uses UUID v7 so identifiers sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(Uuid);

impl ScanId {
    /// Generate a new scan ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
