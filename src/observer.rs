use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::session::{AuthEvent, Session};

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Callback = dyn Fn(AuthEvent, Option<Session>) -> BoxFuture + Send + Sync;

struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Arc<Callback>)>,
}

/// Explicit subscription feed for auth-state change notifications.
///
/// This is the crate-side mirror of the identity backend's
/// `onAuthStateChange` mechanism: the consumer forwards each notification
/// into [`emit`](AuthEventFeed::emit), and subscribers (the token relay,
/// UI state) react to it. Callbacks run one at a time, in registration
/// order — no overlapping invocations.
///
/// # Example
///
/// ```rust,ignore
/// let feed = AuthEventFeed::new();
/// let subscription = feed.subscribe(|event, _session| async move {
///     tracing::debug!(?event, "auth state changed");
/// });
/// feed.emit(AuthEvent::SignedIn, Some(session)).await;
/// drop(subscription); // deterministic teardown
/// ```
pub struct AuthEventFeed {
    listeners: Arc<Mutex<Listeners>>,
}

/// Disposer handle for a single subscription.
///
/// The callback stays registered exactly as long as this handle lives;
/// dropping it (or calling [`unsubscribe`](Self::unsubscribe)) removes the
/// callback from the feed. Holding the handle is the subscription.
pub struct AuthSubscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl AuthEventFeed {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. Returns the disposer handle.
    pub fn subscribe<F, Fut>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(AuthEvent, Option<Session>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Arc<Callback> =
            Arc::new(move |event, session| Box::pin(callback(event, session)));

        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, callback));

        AuthSubscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver one notification to every live subscriber, in order.
    pub async fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        // Snapshot under the lock; callbacks are awaited without it so a
        // subscriber may itself subscribe or unsubscribe.
        let snapshot: Vec<Arc<Callback>> = {
            let listeners = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            listeners
                .entries
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect()
        };

        for callback in snapshot {
            callback(event, session.cloned()).await;
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl Default for AuthEventFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSubscription {
    /// Remove the callback from the feed. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}
