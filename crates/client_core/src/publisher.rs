//! Shared observation of an upstream stream with a grace period before teardown.
//!
//! A [`StatePublisher`] keeps one current value. The first observer starts a
//! single upstream task that feeds every observer; when the last observer
//! detaches the task is kept for [`SharingPolicy::grace_period`] so a quick
//! re-subscription reuses it instead of querying the source again.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use futures::{stream::BoxStream, Stream, StreamExt};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle, time::Instant};
use tracing::debug;

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharingPolicy {
    pub grace_period: Duration,
}

impl SharingPolicy {
    pub fn while_subscribed(grace_period: Duration) -> Self {
        Self { grace_period }
    }
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self::while_subscribed(DEFAULT_GRACE_PERIOD)
    }
}

type UpstreamFactory<T> = dyn Fn() -> BoxStream<'static, T> + Send + Sync;

struct ShareState {
    observers: usize,
    upstream: Option<JoinHandle<()>>,
    teardown: Option<JoinHandle<()>>,
    // Bumped on every acquire so a timer armed before it never fires.
    generation: u64,
    upstream_starts: u64,
}

struct Inner<T> {
    value: Arc<watch::Sender<T>>,
    upstream: Box<UpstreamFactory<T>>,
    policy: SharingPolicy,
    runtime: Handle,
    share: Mutex<ShareState>,
}

pub struct StatePublisher<T> {
    inner: Arc<Inner<T>>,
}

impl<T> StatePublisher<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Builds a publisher holding `initial` until the upstream first emits.
    ///
    /// Must be called from within a Tokio runtime; upstream and teardown
    /// tasks are spawned onto it.
    pub fn new<F>(initial: T, policy: SharingPolicy, upstream: F) -> Self
    where
        F: Fn() -> BoxStream<'static, T> + Send + Sync + 'static,
    {
        let (value, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                value: Arc::new(value),
                upstream: Box::new(upstream),
                policy,
                runtime: Handle::current(),
                share: Mutex::new(ShareState {
                    observers: 0,
                    upstream: None,
                    teardown: None,
                    generation: 0,
                    upstream_starts: 0,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> StateSubscription<T> {
        let receiver = self.inner.value.subscribe();
        self.inner.acquire();
        let share: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        StateSubscription {
            receiver,
            share: share as Weak<dyn Release>,
        }
    }

    pub fn current(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock_share().observers
    }

    /// How many times the upstream has been (re)started.
    pub fn upstream_starts(&self) -> u64 {
        self.inner.lock_share().upstream_starts
    }
}

impl<T> Drop for StatePublisher<T> {
    fn drop(&mut self) {
        let mut share = self.inner.lock_share();
        if let Some(task) = share.teardown.take() {
            task.abort();
        }
        if let Some(task) = share.upstream.take() {
            task.abort();
        }
    }
}

impl<T> Inner<T> {
    fn lock_share(&self) -> MutexGuard<'_, ShareState> {
        self.share.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Inner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn acquire(&self) {
        let mut share = self.lock_share();
        share.observers += 1;
        share.generation = share.generation.wrapping_add(1);

        if let Some(pending) = share.teardown.take() {
            pending.abort();
            debug!(observers = share.observers, "observer returned within grace period");
        }

        if share.upstream.is_none() {
            share.upstream = Some(self.start_upstream());
            share.upstream_starts += 1;
            debug!(
                upstream_starts = share.upstream_starts,
                "started shared upstream"
            );
        }
    }

    fn start_upstream(&self) -> JoinHandle<()> {
        let mut stream = (self.upstream)();
        let value = Arc::clone(&self.value);
        self.runtime.spawn(async move {
            while let Some(next) = stream.next().await {
                publish(&value, next);
            }
            debug!("shared upstream completed");
        })
    }

    fn expire(&self, generation: u64) {
        let mut share = self.lock_share();
        if share.generation != generation || share.observers > 0 {
            return;
        }
        share.teardown = None;
        stop_upstream(&mut share);
    }
}

/// Type-erased observer bookkeeping, so subscriptions can detach from `Drop`.
trait Release: Send + Sync {
    fn release(self: Arc<Self>);
}

impl<T> Release for Inner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn release(self: Arc<Self>) {
        let mut share = self.lock_share();
        share.observers = share.observers.saturating_sub(1);
        if share.observers > 0 {
            return;
        }

        let grace_period = self.policy.grace_period;
        if grace_period.is_zero() {
            stop_upstream(&mut share);
            return;
        }

        let generation = share.generation;
        let deadline = Instant::now() + grace_period;
        let weak = Arc::downgrade(&self);
        share.teardown = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation);
            }
        }));
        debug!(
            grace_period_ms = grace_period.as_millis() as u64,
            "last observer detached; teardown scheduled"
        );
    }
}

fn stop_upstream(share: &mut ShareState) {
    if let Some(task) = share.upstream.take() {
        task.abort();
        debug!("shared upstream torn down");
    }
}

fn publish<T: PartialEq>(value: &watch::Sender<T>, next: T) {
    value.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

/// One observer of a [`StatePublisher`]. Dropping it detaches the observer.
pub struct StateSubscription<T> {
    receiver: watch::Receiver<T>,
    share: Weak<dyn Release>,
}

impl<T> StateSubscription<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Waits for the next distinct value; `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Current value followed by every later distinct value.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold((self, true), |(mut subscription, first)| async move {
            if first {
                let current = subscription.receiver.borrow_and_update().clone();
                return Some((current, (subscription, false)));
            }
            let next = subscription.changed().await?;
            Some((next, (subscription, false)))
        })
    }
}

impl<T> Drop for StateSubscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.share.upgrade() {
            inner.release();
        }
    }
}

#[cfg(test)]
#[path = "tests/publisher_tests.rs"]
mod tests;
