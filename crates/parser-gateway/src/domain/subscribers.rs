//! Subscriber registry.
//!
//! A concurrent set of subscribed addresses. Nothing is persisted and entries
//! never expire.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Reasons a subscription is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscribeError {
    #[error("address should not be empty")]
    Empty,

    #[error("address {0} already subscribed")]
    AlreadySubscribed(String),
}

/// Addresses registered through the subscribe endpoint.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: DashMap<String, DateTime<Utc>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `address`. Check and insert happen under one shard lock, so
    /// two racing subscribers of the same address cannot both succeed.
    pub fn subscribe(&self, address: &str) -> Result<DateTime<Utc>, SubscribeError> {
        if address.is_empty() {
            return Err(SubscribeError::Empty);
        }

        match self.subscribers.entry(address.to_string()) {
            Entry::Occupied(_) => Err(SubscribeError::AlreadySubscribed(address.to_string())),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                slot.insert(now);
                Ok(now)
            }
        }
    }

    pub fn is_subscribed(&self, address: &str) -> bool {
        self.subscribers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
