//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: the scan API consumed by the HTTP gateway
//! - **Driven Ports (Outbound)**: the chain node and clock the scanner depends on

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
