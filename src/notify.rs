//! Notification bus: engine-to-host advisory events.
//!
//! DESIGN
//! ======
//! Subscribers register per [`Notification`] kind. Publishing happens on the
//! thread that sent the command, synchronously, after the engine has finished
//! the command and released its lock. The subscriber list is cloned before any
//! callback runs, so callbacks may subscribe, unsubscribe, query the stage, or
//! read the buffer without deadlocking. A kind with no subscribers is logged
//! and dropped; an error never travels over the bus.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use engine::Notification;
use tracing::{debug, warn};

/// Subscriber callback. Receives the notification kind it fired for.
pub type Callback = Arc<dyn Fn(Notification) + Send + Sync>;

/// Handle returned by [`NotificationBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    kind: Notification,
    callback: Callback,
}

#[derive(Default)]
pub struct NotificationBus {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus").field("subscribers", &self.lock().len()).finish_non_exhaustive()
    }
}

impl NotificationBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `callback` for `kind`. Subscribers of one kind run in
    /// registration order.
    pub fn subscribe<F>(&self, kind: Notification, callback: F) -> SubscriptionId
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscriber { id, kind, callback: Arc::new(callback) });
        debug!(?id, %kind, "subscribed");
        id
    }

    /// Register by host tag name. Unknown tags are logged and ignored.
    pub fn subscribe_tag<F>(&self, tag: &str, callback: F) -> Option<SubscriptionId>
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        let Some(kind) = Notification::from_tag(tag) else {
            warn!(tag, "unknown notification tag; subscription ignored");
            return None;
        };
        Some(self.subscribe(kind, callback))
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Number of live subscriptions for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: Notification) -> usize {
        self.lock().iter().filter(|s| s.kind == kind).count()
    }

    /// Invoke every subscriber of `kind`. Returns how many ran.
    pub fn publish(&self, kind: Notification) -> usize {
        let targets: Vec<Callback> =
            self.lock().iter().filter(|s| s.kind == kind).map(|s| Arc::clone(&s.callback)).collect();
        if targets.is_empty() {
            debug!(%kind, "notification has no subscribers");
            return 0;
        }
        for callback in &targets {
            callback(kind);
        }
        debug!(%kind, delivered = targets.len(), "notification delivered");
        targets.len()
    }
}
