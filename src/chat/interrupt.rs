//! Cancellation of the in-flight request.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A latch set from a signal handler and awaited by the exchange.
///
/// [`InterruptSignal::trigger`] is synchronous so it can be called from the
/// ctrlc handler thread. The flag is authoritative; the notification only
/// wakes a waiter so it can look at the flag.
#[derive(Debug, Default)]
pub struct InterruptSignal {
    triggered: AtomicBool,
    notify: Notify,
}

impl InterruptSignal {
    /// Creates an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the latch and wakes every waiter.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Clears the latch.
    pub fn reset(&self) {
        self.triggered.store(false, Ordering::Release);
    }

    /// Returns true if the latch is set.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Completes once the latch is set.
    pub async fn triggered(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a trigger in between is not lost.
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
