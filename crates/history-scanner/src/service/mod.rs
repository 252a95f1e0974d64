//! # Service Layer
//!
//! Wires the domain logic to the ports: the rate gate, the scan pipeline and
//! the [`HistoryScanner`] that implements the inbound API.

pub mod pipeline;
pub mod rate_gate;
pub mod scanner;

pub use pipeline::{ScanOutcome, ScanPipeline, ScanStats};
pub use rate_gate::RateGate;
pub use scanner::HistoryScanner;
