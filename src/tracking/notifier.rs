use crate::domain::TrackingState;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::trace;

pub type Listener = Arc<dyn Fn(&TrackingState) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fans tracking snapshots out to subscribers, synchronously and in subscription order.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Registry>,
}

impl Notifier {
    pub fn new() -> Self {
        Notifier::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TrackingState) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.lock().push((id, Arc::new(callback)));
        trace!(id, "🔔 Added subscriber");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Listeners are called outside the registry lock so they can unsubscribe themselves.
    pub fn publish(&self, state: &TrackingState) {
        let listeners: Vec<Listener> = self.registry.lock().iter().map(|(_, listener)| listener.clone()).collect();
        trace!(subscribers = listeners.len(), "🔔 Publishing snapshot");

        for listener in listeners {
            listener(state);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for Notifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("subscribers", &self.len()).finish()
    }
}

/// Handle returned by [`Notifier::subscribe`]. Dropping it keeps the subscription alive.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let mut listeners = registry.lock();
        if let Some(index) = listeners.iter().position(|(id, _)| *id == self.id) {
            listeners.remove(index);
            trace!(id = self.id, "🔔 Removed subscriber");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::OnceLock;

    fn state(distance: f64) -> TrackingState {
        TrackingState {
            distance,
            ..TrackingState::default()
        }
    }

    #[test]
    fn publishes_to_every_subscriber_in_subscription_order() {
        let notifier = Notifier::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = calls.clone();
            notifier.subscribe(move |state| calls.lock().unwrap().push((name, state.distance)));
        }
        notifier.publish(&state(1.5));

        assert_eq!(*calls.lock().unwrap(), vec![("first", 1.5), ("second", 1.5), ("third", 1.5)]);
    }

    #[test]
    fn each_publish_notifies_each_subscriber_once() {
        let notifier = Notifier::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        notifier.subscribe(move |_| *calls_clone.lock().unwrap() += 1);

        notifier.publish(&state(1.0));
        notifier.publish(&state(2.0));

        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let notifier = Notifier::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let subscription = notifier.subscribe(move |_| *calls_clone.lock().unwrap() += 1);

        subscription.unsubscribe();
        notifier.publish(&state(1.0));

        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(notifier.is_empty());
    }

    #[test]
    fn unsubscribing_twice_is_a_no_op() {
        let notifier = Notifier::new();
        let first = notifier.subscribe(|_| {});
        notifier.subscribe(|_| {});

        first.unsubscribe();
        first.unsubscribe();

        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn unsubscribe_after_the_notifier_is_gone_is_a_no_op() {
        let subscription = Notifier::new().subscribe(|_| {});

        subscription.unsubscribe();
    }

    #[test]
    fn a_listener_can_unsubscribe_itself() {
        let notifier = Notifier::new();
        let subscription: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());
        let subscription_clone = subscription.clone();

        let handle = notifier.subscribe(move |_| {
            if let Some(subscription) = subscription_clone.get() {
                subscription.unsubscribe();
            }
        });
        subscription.set(handle).unwrap();
        notifier.publish(&state(1.0));

        assert!(notifier.is_empty());
    }
}
