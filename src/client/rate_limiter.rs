//! Rate limiting for record delivery.
//!
//! Provides token bucket pacing so a scan never delivers more than the
//! configured records per second.

use crate::types::RecordsPerSecond;
use governor::{Quota, RateLimiter as GovLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A shared records-per-second throttle.
///
/// Clones share one bucket, so every node worker of a scan draws from the same
/// budget. Burst is one record: deliveries are spread evenly over the second.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<DirectLimiter>,
    rate: NonZeroU32,
}

impl Throttle {
    /// Create a throttle for `rate` records per second.
    pub fn new(rate: NonZeroU32) -> Self {
        Self::with_burst(rate, nonzero!(1u32))
    }

    /// Create a throttle allowing `burst` records before pacing kicks in.
    pub fn with_burst(rate: NonZeroU32, burst: NonZeroU32) -> Self {
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
            rate,
        }
    }

    /// Build a throttle from a scan hint; `None` when the hint is unlimited.
    pub fn from_hint(hint: RecordsPerSecond) -> Option<Self> {
        hint.limit().map(Self::new)
    }

    /// Configured ceiling.
    pub fn rate(&self) -> NonZeroU32 {
        self.rate
    }

    /// Wait until another record may be delivered.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Blocking variant of [`wait`](Self::wait) for plain worker threads.
    pub fn wait_blocking(&self) {
        futures::executor::block_on(self.limiter.until_ready());
    }

    /// Try to take a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").field("rate", &self.rate).finish()
    }
}
