//! Per-user exclusive sections
//!
//! Every mutating command runs its read-modify-write sequence inside the section of the user it
//! targets. Sections of different users are independent, so unrelated users never wait on each
//! other. Waiters on the same section are served in request order.
//!
//! Handles are created on first use and dropped from the registry as soon as nobody holds or
//! waits on them, so the registry only grows with the number of users currently in flight.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct SectionRegistry {
    sections: DashMap<u64, Arc<Mutex<()>>>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the section of `user_id`
    ///
    /// The section is released when the returned guard is dropped, including when the future
    /// holding it is cancelled or returns early with an error.
    pub async fn enter(self: &Arc<Self>, user_id: u64) -> SectionGuard {
        // Get-or-create happens under the shard lock, so concurrent first-time callers all end
        // up with the same handle. The shard lock is released before waiting on the section.
        let section = self.sections.entry(user_id).or_default().clone();

        tracing::debug!(user_id, "waiting for section");
        let guard = section.lock_owned().await;
        tracing::debug!(user_id, "section acquired");

        SectionGuard {
            user_id,
            guard: Some(guard),
            registry: Arc::clone(self),
        }
    }

    /// Number of sections currently held or waited on
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Drop the handle of `user_id` if the registry holds the only reference to it
    ///
    /// Every clone of a handle is taken under the shard lock, which `remove_if` also holds while
    /// checking the count, so a handle cannot be handed out and evicted at the same time.
    fn evict_idle(&self, user_id: u64) {
        self.sections
            .remove_if(&user_id, |_, section| Arc::strong_count(section) == 1);
    }
}

/// Exclusive access to the section of a single user
#[derive(Debug)]
#[must_use = "the section is released as soon as the guard is dropped"]
pub struct SectionGuard {
    user_id: u64,
    guard: Option<OwnedMutexGuard<()>>,
    registry: Arc<SectionRegistry>,
}

impl SectionGuard {
    pub fn user_id(&self) -> u64 {
        self.user_id
    }
}

impl Drop for SectionGuard {
    fn drop(&mut self) {
        // The guard owns a reference to the handle: release it first so eviction can see
        // whether anybody else is still waiting.
        drop(self.guard.take());
        self.registry.evict_idle(self.user_id);
        tracing::debug!(user_id = self.user_id, "section released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[tokio::test]
    async fn test_same_user_waits() {
        // GIVEN a held section
        let registry = Arc::new(SectionRegistry::new());
        let guard = registry.enter(1).await;

        // WHEN entering the same section again
        let res = tokio::time::timeout(Duration::from_millis(50), registry.enter(1)).await;

        // THEN it does not complete while the first guard is alive
        assert_that!(res.is_err()).is_true();

        // AND it completes once the first guard is dropped
        drop(guard);
        let res = tokio::time::timeout(Duration::from_millis(50), registry.enter(1)).await;
        assert_that!(res)
            .is_ok()
            .matches(|guard| guard.user_id() == 1);
    }

    #[tokio::test]
    async fn test_other_users_do_not_wait() {
        let registry = Arc::new(SectionRegistry::new());
        let _guard = registry.enter(1).await;

        let res = tokio::time::timeout(Duration::from_millis(50), registry.enter(2)).await;

        assert_that!(res).is_ok();
        assert_that!(registry.len()).is_equal_to(2);
    }

    #[tokio::test]
    async fn test_idle_section_is_evicted() {
        let registry = Arc::new(SectionRegistry::new());

        let guard = registry.enter(1).await;
        assert_that!(registry.len()).is_equal_to(1);
        drop(guard);

        assert_that!(registry.is_empty()).is_true();
    }

    #[tokio::test]
    async fn test_waited_section_is_kept() {
        // GIVEN a held section with a waiter queued behind it
        let registry = Arc::new(SectionRegistry::new());
        let guard = registry.enter(1).await;
        let waiter = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move {
                let _guard = registry.enter(1).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // WHEN the holder releases it
        drop(guard);

        // THEN the handle survives until the waiter is done with it
        assert_that!(registry.len()).is_equal_to(1);
        waiter.await.unwrap();
        assert_that!(registry.is_empty()).is_true();
    }

    #[tokio::test]
    async fn test_waiters_are_served_in_order() {
        // GIVEN a held section and waiters queued one after the other
        let registry = Arc::new(SectionRegistry::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let guard = registry.enter(1).await;

        let mut handles = Vec::new();
        for i in 0..5 {
            let registry = Arc::clone(&registry);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let _guard = registry.enter(1).await;
                order.lock().unwrap().push(i);
            }));
            // Let the task reach the queue before spawning the next one
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // WHEN releasing the section
        drop(guard);
        for handle in handles {
            handle.await.unwrap();
        }

        // THEN waiters ran in the order they queued
        assert_that!(*order.lock().unwrap()).is_equal_to(vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_at_most_one_holder() {
        let registry = Arc::new(SectionRegistry::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                tokio::spawn(async move {
                    let _guard = registry.enter(9).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_that!(max_inside.load(Ordering::SeqCst)).is_equal_to(1);
        assert_that!(registry.is_empty()).is_true();
    }
}
