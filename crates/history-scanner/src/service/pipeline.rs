//! # Scan Pipeline
//!
//! Fan-out / fan-in over one block range:
//!
//! ```text
//!   partition(first, last)          chunk queue (descending)
//!          │                                 │
//!          ▼                   ┌─────────────┼─────────────┐
//!   [Dispatching]              ▼             ▼             ▼
//!                          worker 0      worker 1  ...  worker N-1
//!                          gate.acquire → client.fetch_blocks(chunk)
//!                              │             │             │
//!                              └──── bounded channel ──────┘
//!                                            │
//!   [Draining]                               ▼
//!                                   single consumer
//!                           timestamp → age cutoff → address filter
//!                                            │
//!   [Done]                       cancel token fired, accumulator returned
//! ```
//!
//! Producers push each block with a biased select against the cancellation
//! token, so once the consumer stops no producer is left blocked on a full
//! channel. Network calls already issued are not aborted; their results are
//! discarded by a detached reaper.
//!
//! In descending order the consumer can only release the oldest unreleased
//! chunk, so workers hold a window permit per chunk and the consumer returns
//! one for every chunk it releases. At most `workers` chunks are buffered.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::rate_gate::RateGate;
use crate::domain::{
    matching_transactions, partition, AgeCutoff, Block, BlockNumber, Chunk, ConsumeOrder,
    RpcError, ScanConfig, ScanId, Transaction,
};
use crate::ports::{ChainClient, ScanRequest, TimeSource};

/// Counters describing how a scan went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Chunks the range was split into.
    pub chunks_total: usize,
    /// Chunks whose fetch completed and were fully delivered.
    pub chunks_fetched: usize,
    /// Chunks whose fetch failed (transport or decode).
    pub chunks_failed: usize,
    /// Blocks that passed the age check and were filtered.
    pub blocks_consumed: usize,
    /// Blocks skipped because their timestamp could not be decoded.
    pub blocks_skipped: usize,
    /// Block number (hex) that triggered the age cutoff, if any.
    pub stopped_at: Option<String>,
}

impl ScanStats {
    /// Whether the age cutoff ended the scan.
    pub fn stopped_early(&self) -> bool {
        self.stopped_at.is_some()
    }
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub scan_id: ScanId,
    /// Matching transactions in consumer order.
    pub transactions: Vec<Transaction>,
    pub stats: ScanStats,
}

enum ScanEvent {
    Block { chunk: usize, block: Block },
    ChunkDone { chunk: usize, failed: bool },
}

/// Runs historical scans against a [`ChainClient`].
pub struct ScanPipeline {
    client: Arc<dyn ChainClient>,
    gate: Arc<RateGate>,
    clock: Arc<dyn TimeSource>,
    config: ScanConfig,
}

impl ScanPipeline {
    /// Build a pipeline sharing `gate` with every other user of the same node.
    pub fn new(
        client: Arc<dyn ChainClient>,
        gate: Arc<RateGate>,
        clock: Arc<dyn TimeSource>,
        config: ScanConfig,
    ) -> Self {
        Self {
            client,
            gate,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `request.first_block..=request.last_block` walking down from the head.
    pub async fn run(&self, request: ScanRequest) -> ScanOutcome {
        let scan_id = ScanId::new();
        let span = info_span!(
            "scan",
            %scan_id,
            address = %request.address,
            first = request.first_block,
            last = request.last_block,
        );
        self.execute(scan_id, request).instrument(span).await
    }

    async fn execute(&self, scan_id: ScanId, request: ScanRequest) -> ScanOutcome {
        let chunks = partition(
            request.first_block,
            request.last_block,
            self.config.batch_size,
        );
        if chunks.is_empty() {
            debug!("Empty block range, nothing to scan");
            return ScanOutcome {
                scan_id,
                transactions: Vec::new(),
                stats: ScanStats::default(),
            };
        }

        let cutoff = AgeCutoff::from_day_limit(request.day_limit, self.clock.now());
        let worker_count = self.config.workers.min(chunks.len());
        info!(
            chunks = chunks.len(),
            workers = worker_count,
            day_limit = request.day_limit,
            order = %self.config.consume_order,
            "Starting scan"
        );

        let window = match self.config.consume_order {
            ConsumeOrder::Arrival => None,
            ConsumeOrder::Descending => Some(Arc::new(Semaphore::new(worker_count))),
        };
        let (tx, mut rx) = mpsc::channel(self.config.channel_capacity());
        let cancel = CancellationToken::new();
        let queue: Arc<Mutex<VecDeque<(usize, Chunk)>>> =
            Arc::new(Mutex::new(chunks.iter().copied().enumerate().collect()));

        let mut workers = JoinSet::new();
        for worker in 0..worker_count {
            let fetcher = ChunkWorker {
                id: worker,
                queue: Arc::clone(&queue),
                client: Arc::clone(&self.client),
                gate: Arc::clone(&self.gate),
                full_transactions: self.config.full_transactions,
                chunk_timeout: self.config.chunk_timeout,
                window: window.clone(),
                tx: tx.clone(),
                cancel: cancel.clone(),
            };
            workers.spawn(fetcher.run().in_current_span());
        }
        drop(tx);

        let mut consumer = Consumer::new(&request.address, cutoff, window, chunks.len());
        while let Some(event) = rx.recv().await {
            if consumer.handle(event).is_break() {
                break;
            }
        }

        // Done: stop producers, then let any in-flight fetch finish on its own.
        cancel.cancel();
        drop(rx);
        let stats = consumer.stats.clone();
        if stats.stopped_early() {
            tokio::spawn(reap(workers).in_current_span());
        } else {
            reap(workers).await;
        }

        info!(
            matches = consumer.transactions.len(),
            blocks = stats.blocks_consumed,
            skipped = stats.blocks_skipped,
            failed_chunks = stats.chunks_failed,
            stopped_early = stats.stopped_early(),
            "Scan finished"
        );

        ScanOutcome {
            scan_id,
            transactions: consumer.transactions,
            stats,
        }
    }
}

async fn reap(mut workers: JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                error!(error = %e, "Chunk worker panicked");
            }
        }
    }
}

/// One producer in the bounded worker pool.
struct ChunkWorker {
    id: usize,
    queue: Arc<Mutex<VecDeque<(usize, Chunk)>>>,
    client: Arc<dyn ChainClient>,
    gate: Arc<RateGate>,
    full_transactions: bool,
    chunk_timeout: Duration,
    /// Reorder window, present only in descending order.
    window: Option<Arc<Semaphore>>,
    tx: mpsc::Sender<ScanEvent>,
    cancel: CancellationToken,
}

impl ChunkWorker {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(window) = &self.window {
                let permit = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    permit = window.acquire() => permit,
                };
                // Returned by the consumer once this chunk is released.
                match permit {
                    Ok(permit) => permit.forget(),
                    Err(_) => break,
                }
            }
            let next = { self.queue.lock().pop_front() };
            let Some((index, chunk)) = next else {
                break;
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.gate.acquire() => {}
            }

            let failed = match self.fetch(chunk).await {
                Ok(blocks) => {
                    debug!(worker = self.id, chunk = %chunk, blocks = blocks.len(), "Fetched chunk");
                    for block in blocks {
                        if !self.emit(ScanEvent::Block { chunk: index, block }).await {
                            return;
                        }
                    }
                    false
                }
                Err(e) => {
                    warn!(
                        worker = self.id,
                        start = chunk.start,
                        end = chunk.end,
                        error = %e,
                        "Error fetching blocks; chunk skipped"
                    );
                    true
                }
            };

            if !self
                .emit(ScanEvent::ChunkDone {
                    chunk: index,
                    failed,
                })
                .await
            {
                return;
            }
        }
    }

    async fn fetch(&self, chunk: Chunk) -> Result<Vec<Block>, RpcError> {
        match tokio::time::timeout(
            self.chunk_timeout,
            self.client.fetch_blocks(chunk, self.full_transactions),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout(self.chunk_timeout)),
        }
    }

    /// Push an event unless the scan was cancelled first. Returns `false` when
    /// the worker should stop.
    async fn emit(&self, event: ScanEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }
}

/// The single consumer: owns the accumulator and the stop decision.
struct Consumer<'a> {
    address: &'a str,
    cutoff: Option<AgeCutoff>,
    reorder: Option<ReorderBuffer>,
    transactions: Vec<Transaction>,
    stats: ScanStats,
}

impl<'a> Consumer<'a> {
    fn new(
        address: &'a str,
        cutoff: Option<AgeCutoff>,
        window: Option<Arc<Semaphore>>,
        chunks_total: usize,
    ) -> Self {
        Self {
            address,
            cutoff,
            reorder: window.map(ReorderBuffer::new),
            transactions: Vec::new(),
            stats: ScanStats {
                chunks_total,
                ..Default::default()
            },
        }
    }

    fn handle(&mut self, event: ScanEvent) -> ControlFlow<()> {
        match event {
            ScanEvent::Block { chunk, block } => {
                if let Some(buffer) = self.reorder.as_mut() {
                    buffer.push(chunk, block);
                    return ControlFlow::Continue(());
                }
                self.consume(block)
            }
            ScanEvent::ChunkDone { chunk, failed } => {
                if failed {
                    self.stats.chunks_failed += 1;
                } else {
                    self.stats.chunks_fetched += 1;
                }
                let ready = match self.reorder.as_mut() {
                    Some(buffer) => buffer.complete(chunk),
                    None => return ControlFlow::Continue(()),
                };
                for block in ready {
                    if self.consume(block).is_break() {
                        return ControlFlow::Break(());
                    }
                }
                ControlFlow::Continue(())
            }
        }
    }

    fn consume(&mut self, block: Block) -> ControlFlow<()> {
        let timestamp = match block.timestamp_secs() {
            Ok(ts) => ts,
            Err(e) => {
                warn!(block = %block.number, error = %e, "Error converting block timestamp; block skipped");
                self.stats.blocks_skipped += 1;
                return ControlFlow::Continue(());
            }
        };

        if let Some(cutoff) = self.cutoff {
            if cutoff.is_expired(timestamp) {
                info!(
                    block = %block.number,
                    block_time = %format_timestamp(timestamp),
                    "Stopping scan at block older than the day limit"
                );
                self.stats.stopped_at = Some(block.number);
                return ControlFlow::Break(());
            }
        }

        self.stats.blocks_consumed += 1;
        self.transactions
            .extend(matching_transactions(block, self.address));
        ControlFlow::Continue(())
    }
}

/// Releases blocks chunk by chunk in dispatch order (head first).
struct ReorderBuffer {
    pending: HashMap<usize, Vec<Block>>,
    completed: BTreeSet<usize>,
    next: usize,
    window: Arc<Semaphore>,
}

impl ReorderBuffer {
    fn new(window: Arc<Semaphore>) -> Self {
        Self {
            pending: HashMap::new(),
            completed: BTreeSet::new(),
            next: 0,
            window,
        }
    }

    fn push(&mut self, chunk: usize, block: Block) {
        self.pending.entry(chunk).or_default().push(block);
    }

    /// Mark `chunk` complete and return every block that is now releasable,
    /// newest first.
    fn complete(&mut self, chunk: usize) -> Vec<Block> {
        self.completed.insert(chunk);
        let mut ready = Vec::new();
        while self.completed.remove(&self.next) {
            let mut blocks = self.pending.remove(&self.next).unwrap_or_default();
            blocks.sort_by_key(|block| Reverse(block.number().unwrap_or(BlockNumber::MIN)));
            ready.extend(blocks);
            self.next += 1;
            self.window.add_permits(1);
        }
        ready
    }
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockTransactions;

    fn block(number: u64, timestamp: &str, txs: Vec<Transaction>) -> Block {
        Block {
            number: format!("0x{number:x}"),
            timestamp: timestamp.to_string(),
            transactions: BlockTransactions::Full(txs),
        }
    }

    fn tx(from: &str, to: &str) -> Transaction {
        Transaction {
            from: from.into(),
            to: Some(to.into()),
            ..Default::default()
        }
    }

    fn window(permits: usize) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(permits))
    }

    #[test]
    fn test_reorder_buffer_releases_in_chunk_order() {
        let window = window(0);
        let mut buffer = ReorderBuffer::new(Arc::clone(&window));
        buffer.push(1, block(5, "0x1", vec![]));
        buffer.push(1, block(6, "0x1", vec![]));
        assert!(buffer.complete(1).is_empty());

        buffer.push(0, block(9, "0x1", vec![]));
        buffer.push(0, block(10, "0x1", vec![]));
        let released: Vec<_> = buffer
            .complete(0)
            .iter()
            .map(|b| b.number().unwrap())
            .collect();
        assert_eq!(released, vec![10, 9, 6, 5]);
        assert_eq!(window.available_permits(), 2);
    }

    #[test]
    fn test_reorder_buffer_holds_window_until_head_completes() {
        let window = window(0);
        let mut buffer = ReorderBuffer::new(Arc::clone(&window));
        assert!(buffer.complete(2).is_empty());
        assert!(buffer.complete(1).is_empty());
        assert_eq!(window.available_permits(), 0);

        buffer.complete(0);
        assert_eq!(window.available_permits(), 3);
    }

    #[test]
    fn test_reorder_buffer_failed_chunk_releases_empty() {
        let mut buffer = ReorderBuffer::new(window(0));
        buffer.push(1, block(1, "0x1", vec![]));
        assert!(buffer.complete(1).is_empty());
        // Chunk 0 failed: no blocks, but completion unblocks chunk 1.
        assert_eq!(buffer.complete(0).len(), 1);
    }

    #[test]
    fn test_consumer_skips_bad_timestamp() {
        let mut consumer = Consumer::new("0xA", None, None, 1);
        let flow = consumer.consume(block(1, "garbage", vec![tx("0xA", "0xB")]));
        assert!(flow.is_continue());
        assert!(consumer.transactions.is_empty());
        assert_eq!(consumer.stats.blocks_skipped, 1);
    }

    #[test]
    fn test_consumer_stops_on_expired_block_without_collecting_it() {
        let cutoff = AgeCutoff::from_day_limit(1, 200_000);
        let mut consumer = Consumer::new("0xA", cutoff, None, 1);

        assert!(consumer
            .consume(block(2, "0x30d40", vec![tx("0xA", "0xB")]))
            .is_continue());
        assert!(consumer
            .consume(block(1, "0x1", vec![tx("0xA", "0xB")]))
            .is_break());
        assert_eq!(consumer.transactions.len(), 1);
        assert_eq!(consumer.stats.stopped_at.as_deref(), Some("0x1"));
    }

    #[test]
    fn test_descending_consumer_waits_for_head_chunk() {
        let mut consumer = Consumer::new("0xA", None, Some(window(2)), 2);
        let _ = consumer.handle(ScanEvent::Block {
            chunk: 1,
            block: block(1, "0x1", vec![tx("0xB", "0xA")]),
        });
        let _ = consumer.handle(ScanEvent::ChunkDone {
            chunk: 1,
            failed: false,
        });
        assert!(consumer.transactions.is_empty());

        let _ = consumer.handle(ScanEvent::Block {
            chunk: 0,
            block: block(2, "0x1", vec![tx("0xA", "0xC")]),
        });
        let _ = consumer.handle(ScanEvent::ChunkDone {
            chunk: 0,
            failed: false,
        });
        let recipients: Vec<_> = consumer
            .transactions
            .iter()
            .map(|t| t.to.clone().unwrap())
            .collect();
        assert_eq!(recipients, vec!["0xC", "0xA"]);
        assert_eq!(consumer.stats.chunks_fetched, 2);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
        assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
    }
}
