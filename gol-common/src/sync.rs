//! Rendezvous primitives for the worker's per-turn pipeline.
//!
//! These model the "single-capacity channel" idiom the spec calls for
//! (`nextBoard`, `botHalo`) as a mutex-guarded optional value plus a
//! `Notify`, and the "world-built" one-shot signal as an atomic flag that
//! is raised once and never lowered.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, Notify};

/// A single-item rendezvous slot: `put` overwrites whatever was there,
/// `take` blocks until a value is available and consumes it.
pub struct Slot<T> {
    value: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    pub async fn put(&self, val: T) {
        let mut guard = self.value.lock().await;
        *guard = Some(val);
        self.notify.notify_one();
    }

    pub async fn take(&self) -> T {
        loop {
            let notified = self.notify.notified();
            {
                let mut guard = self.value.lock().await;
                if let Some(val) = guard.take() {
                    return val;
                }
            }
            notified.await;
        }
    }
}

/// A signal raised exactly once and never lowered. Waiters registered
/// before the signal is raised are woken; waiters registered after see the
/// flag already set and return immediately.
#[derive(Default)]
pub struct OnceSignal {
    raised: AtomicBool,
    notify: Notify,
}

impl OnceSignal {
    pub fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.raised.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn slot_blocks_until_put() {
        let slot = Arc::new(Slot::<u32>::new());
        let reader = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.take().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        slot.put(42).await;
        assert_eq!(reader.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn once_signal_wakes_waiters_and_stays_raised() {
        let signal = Arc::new(OnceSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.raise();
        waiter.await.unwrap();
        assert!(signal.is_raised());
        signal.wait().await; // must not block a second time
    }
}
