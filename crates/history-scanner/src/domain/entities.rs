//! # Domain Entities
//!
//! Block and transaction records as returned by `eth_getBlockByNumber`.
//!
//! Quantities stay in their wire form (hex strings). The scanner decodes only
//! what it needs (block number and timestamp) and only when it needs them, so
//! a malformed field affects a single block instead of the whole batch.

use serde::{Deserialize, Serialize};

use super::value_objects::{parse_hex_quantity, BlockNumber, HexQuantityError};

/// A block as delivered by the remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number as a hex quantity.
    pub number: String,
    /// Seconds since the Unix epoch as a hex quantity.
    pub timestamp: String,
    /// Transactions in source order.
    #[serde(default)]
    pub transactions: BlockTransactions,
}

impl Block {
    /// Decoded block number.
    pub fn number(&self) -> Result<BlockNumber, HexQuantityError> {
        parse_hex_quantity(&self.number)
    }

    /// Decoded block timestamp in seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> Result<u64, HexQuantityError> {
        parse_hex_quantity(&self.timestamp)
    }

    /// Full transaction objects, empty when the block was fetched with hashes only.
    pub fn full_transactions(&self) -> &[Transaction] {
        match &self.transactions {
            BlockTransactions::Full(txs) => txs,
            BlockTransactions::Hashes(_) => &[],
        }
    }

    /// Consume the block, keeping only its full transaction objects.
    pub fn into_full_transactions(self) -> Vec<Transaction> {
        match self.transactions {
            BlockTransactions::Full(txs) => txs,
            BlockTransactions::Hashes(_) => Vec::new(),
        }
    }
}

/// The `transactions` field of a block: full objects or bare hashes,
/// depending on the `includeFullTransactions` flag of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Full(Vec<Transaction>),
    Hashes(Vec<String>),
}

impl Default for BlockTransactions {
    fn default() -> Self {
        Self::Full(Vec::new())
    }
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            Self::Full(txs) => txs.len(),
            Self::Hashes(hashes) => hashes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A transaction inside a block.
///
/// Only `from` and `to` are inspected by the scanner; everything else is
/// carried through untouched to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub nonce: String,
    /// Recipient; `None` for contract creation.
    #[serde(default)]
    pub to: Option<String>,
    /// Sender.
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_blob_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_parity: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub transaction_index: Option<String>,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub v: String,
}

impl Transaction {
    /// Whether `address` is the sender or the recipient (exact, case-sensitive).
    pub fn touches(&self, address: &str) -> bool {
        self.from == address || self.to.as_deref() == Some(address)
    }
}

/// EIP-2930 access list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: String,
    #[serde(default)]
    pub storage_keys: Vec<String>,
}
