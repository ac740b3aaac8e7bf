//! Liveness tokens for components that issue asynchronous requests.
//!
//! Every `FeedController` and `PostView` owns a `Lifecycle`. Spawned requests
//! carry a `Liveness` handle: once the owner is dropped the request future is
//! abandoned, and any result that was already in the channel is tagged with an
//! id no live component answers to.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifecycleId(u64);

#[derive(Debug)]
pub struct Lifecycle {
    id: LifecycleId,
    token: CancellationToken,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            id: LifecycleId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            token: CancellationToken::new(),
        }
    }

    pub const fn id(&self) -> LifecycleId {
        self.id
    }

    /// Whether a result tagged with `owner` belongs to this live component.
    pub fn owns(&self, owner: LifecycleId) -> bool {
        self.id == owner && !self.token.is_cancelled()
    }

    pub fn liveness(&self) -> Liveness {
        Liveness {
            id: self.id,
            token: self.token.clone(),
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Cloneable handle moved into spawned request tasks.
#[derive(Debug, Clone)]
pub struct Liveness {
    id: LifecycleId,
    token: CancellationToken,
}

impl Liveness {
    pub const fn owner(&self) -> LifecycleId {
        self.id
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_alive(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Run `fut` unless the owner is torn down first. `None` means torn down.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
