//! Dispatch rate gate.
//!
//! A GCRA limiter with a burst of one: permits are spaced by `1 / rate`
//! seconds no matter how many tasks are waiting, and an idle gate holds at
//! most one ready permit. The limiter state is a single atomic cell, so
//! concurrent `acquire()` calls never lose or duplicate a permit, and there
//! is no background timer to stop.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::domain::ConfigError;

/// Shared gate limiting how often chunk fetches may start.
pub struct RateGate {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    period: Duration,
}

impl RateGate {
    /// Gate issuing `rate` permits per second.
    pub fn per_second(rate: u32) -> Result<Self, ConfigError> {
        let rate = NonZeroU32::new(rate).ok_or(ConfigError::ZeroRateLimit)?;
        let quota = Quota::per_second(rate).allow_burst(NonZeroU32::MIN);

        Ok(Self {
            limiter: RateLimiter::direct(quota),
            period: Duration::from_secs(1) / rate.get(),
        })
    }

    /// Wait for the next permit.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Spacing between consecutive permits.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}
