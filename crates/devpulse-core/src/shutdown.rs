//! Cooperative shutdown signalling.
//!
//! Backoff waits and the between-cycle sleep are the only suspension points
//! in a polling cycle; both race against this handle so a Ctrl+C does not
//! have to wait out a long timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

/// Cloneable handle signalling that the process should stop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<Inner>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Wakes all waiters exactly once.
    pub fn request(&self) {
        if !self.inner.requested.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait(&self) {
        // Register interest before checking the flag so a request landing
        // in between cannot be missed.
        let notified = self.inner.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}
