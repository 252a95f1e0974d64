//! # Range Partitioning
//!
//! Splits a closed block interval into descending, non-overlapping chunks.

use super::value_objects::{BlockNumber, Chunk};

/// Partition `[first, last]` into chunks of at most `size` blocks, ordered from
/// the head (`last`) down to `first`.
///
/// The top of each chunk descends by `size` from `last`; the final chunk is
/// clipped at `first`. Inverted bounds or a zero size yield no chunks.
///
/// ```
/// use history_scanner::domain::{partition, Chunk};
///
/// let chunks = partition(1, 2500, 1000);
/// assert_eq!(
///     chunks,
///     vec![Chunk::new(1501, 2500), Chunk::new(501, 1500), Chunk::new(1, 500)]
/// );
/// ```
pub fn partition(first: BlockNumber, last: BlockNumber, size: u64) -> Vec<Chunk> {
    if first > last || size == 0 {
        return Vec::new();
    }

    let span = last - first;
    let capacity = usize::try_from(span / size + 1).unwrap_or(usize::MAX);
    let mut chunks = Vec::with_capacity(capacity.min(1 << 16));

    let mut end = last;
    loop {
        let start = end.saturating_sub(size - 1).max(first);
        chunks.push(Chunk::new(start, end));
        if start == first {
            break;
        }
        end = start - 1;
    }

    chunks
}
