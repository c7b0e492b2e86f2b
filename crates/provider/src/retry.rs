//! Lock-aware retry for mutations that race remote operations

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::warn;

use crate::client::{LockTarget, Manager};

/// Fixed-interval retry, no backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 15,
            delay: Duration::from_secs(1),
        }
    }
}

/// Something that can block until its remote lock clears
#[async_trait]
pub trait Lockable: Send + Sync {
    async fn wait_unlocked(&self) -> bcc_common::Result<()>;
}

/// [`Lockable`] view of an entity behind a [`Manager`]
pub struct LockHandle<'a> {
    api: &'a dyn Manager,
    target: LockTarget<'a>,
}

impl<'a> LockHandle<'a> {
    pub fn new(api: &'a dyn Manager, target: LockTarget<'a>) -> Self {
        Self { api, target }
    }
}

#[async_trait]
impl Lockable for LockHandle<'_> {
    async fn wait_unlocked(&self) -> bcc_common::Result<()> {
        self.api.wait_lock(self.target).await
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// Every attempt first waits for `target` to unlock. Every failure is
/// retried the same way; the last one is returned.
pub async fn repeat_on_error<T, F, Fut>(policy: &RetryPolicy, target: &dyn Lockable, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt in 1..=policy.attempts {
        if let Err(e) = target.wait_unlocked().await {
            warn!(attempt, "waiting for lock failed: {}", e);
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt, "attempt failed: {:#}", e);
                last_error = Some(e);
            }
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("no attempts were made")))
}
