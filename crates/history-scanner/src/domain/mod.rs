//! Domain layer: pure scan logic with no I/O.

pub mod config;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod partition;
pub mod value_objects;

pub use config::{ConsumeOrder, RpcConfig, ScanConfig, DEFAULT_RPC_URL, MAX_BATCH_SIZE};
pub use entities::{AccessListItem, Block, BlockTransactions, Transaction};
pub use errors::{AddressError, ConfigError, RpcError};
pub use filter::{matching_transactions, AgeCutoff, SECONDS_PER_DAY};
pub use partition::partition;
pub use value_objects::{
    parse_hex_quantity, to_hex_quantity, BlockNumber, Chunk, HexQuantityError, ScanId,
};
