//! Revocable subscription handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

/// Handle to a live subscription.
///
/// `unsubscribe` is idempotent: it may be called any number of times, from
/// any clone, including after the owning context has already torn down.
/// Dropping the handle does not revoke the subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    active: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SubscriptionHandle {
    /// Wraps the delivery task backing a subscription.
    pub fn for_task(task: JoinHandle<()>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                active: AtomicBool::new(true),
                task: Mutex::new(Some(task)),
            }),
        }
    }

    /// Stops delivery. Safe to call repeatedly.
    pub fn unsubscribe(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            if let Some(task) = self.inner.task.lock().unwrap().take() {
                task.abort();
            }
        }
    }

    /// Whether the subscription is still delivering.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let task = tokio::spawn(async {
            std::future::pending::<()>().await;
        });
        let handle = SubscriptionHandle::for_task(task);
        assert!(handle.is_active());

        handle.unsubscribe();
        assert!(!handle.is_active());

        // Second and third calls are no-ops, including via a clone.
        handle.unsubscribe();
        handle.clone().unsubscribe();
    }
}
