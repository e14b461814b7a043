//! Change notifications for renderers.
//!
//! Subscribers are called synchronously right after a state change commits,
//! with no session lock held. Effects that depend on the renderer having
//! laid out the new state (scrolling to the latest turn) are queued instead
//! and drained by the renderer at its next idle point.

use crate::connection::ConnectionState;
use crate::history::ChatTurn;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A turn was appended at `index`
    TurnAppended { index: usize, turn: Arc<ChatTurn> },
    /// The single-flight send flag changed
    SendingChanged(bool),
    ConnectionStateChanged(ConnectionState),
    /// An action asked for the configuration surface
    SettingsRequested,
}

/// Side effects that must wait until the renderer has drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    ScrollToLatest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct EventBusInner {
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
    effects_tx: async_channel::Sender<UiEffect>,
    effects_rx: async_channel::Receiver<UiEffect>,
}

/// Cloneable handle; all clones share subscribers and the effect queue
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (effects_tx, effects_rx) = async_channel::unbounded();
        Self {
            inner: Arc::new(EventBusInner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                effects_tx,
                effects_rx,
            }),
        }
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Subscriber)>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Subscriber = Arc::new(callback);
        self.subscribers().push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Notify subscribers in registration order
    pub fn emit(&self, event: &SessionEvent) {
        // Snapshot first so callbacks may (un)subscribe without deadlocking
        let subscribers: Vec<Subscriber> = self
            .subscribers()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in subscribers {
            callback(event);
        }
    }

    pub fn defer(&self, effect: UiEffect) {
        if let Err(e) = self.inner.effects_tx.try_send(effect) {
            warn!("Dropping deferred UI effect: {e}");
        }
    }

    /// Take every effect queued so far without waiting
    pub fn drain_effects(&self) -> Vec<UiEffect> {
        let mut effects = Vec::new();
        while let Ok(effect) = self.inner.effects_rx.try_recv() {
            effects.push(effect);
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_run_in_order_until_unsubscribed() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            bus.subscribe(move |event| {
                if let SessionEvent::SendingChanged(v) = event {
                    seen.lock().unwrap().push(("first", *v));
                }
            })
        };
        {
            let seen = seen.clone();
            bus.subscribe(move |event| {
                if let SessionEvent::SendingChanged(v) = event {
                    seen.lock().unwrap().push(("second", *v));
                }
            });
        }

        bus.emit(&SessionEvent::SendingChanged(true));
        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        bus.emit(&SessionEvent::SendingChanged(false));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", true), ("second", true), ("second", false)]
        );
    }

    #[test]
    fn test_subscriber_may_subscribe_during_emit() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        bus.subscribe(move |_| {
            inner_bus.subscribe(|_| {});
        });

        bus.emit(&SessionEvent::SettingsRequested);
        assert_eq!(bus.subscribers().len(), 2);
    }

    #[test]
    fn test_effects_wait_for_drain() {
        let bus = EventBus::new();
        assert!(bus.drain_effects().is_empty());

        bus.defer(UiEffect::ScrollToLatest);
        bus.clone().defer(UiEffect::ScrollToLatest);

        assert_eq!(
            bus.drain_effects(),
            vec![UiEffect::ScrollToLatest, UiEffect::ScrollToLatest]
        );
        assert!(bus.drain_effects().is_empty());
    }
}
