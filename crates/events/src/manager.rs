//! Composite event manager.
//!
//! An [`EventManager`] combines three ways of reacting to an event:
//!
//! 1. callbacks registered directly on the manager (its own
//!    [`ListenerRegistry`]);
//! 2. attached listeners, any [`Triggerable`] (including other managers);
//! 3. subscribers, any [`Publishable`], gated by the keys they subscribed to.
//!
//! `trigger` walks the three phases in that order, synchronously, on the
//! caller's thread. Each phase copies its handlers when it starts and runs
//! them with no lock held, so handlers may register, subscribe or trigger on
//! the same manager without deadlocking. A change made by a handler is seen
//! by every later phase of the same trigger, but not by the phase that is
//! already running.
//!
//! ## Failure policy
//!
//! The first handler error ends the dispatch and is returned unchanged.
//! Nothing is retried, wrapped or logged on the handler's behalf.

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use tracing::{debug, trace};

use herald_core::{Ancestry, Event, EventKey, EventResult, EventType, HandlerResult};

use crate::capability::{Publishable, Triggerable};
use crate::registry::{self, Callback, ListenerRegistry};
use crate::subscription::{SubscriberId, SubscriptionTable, Topics};
use crate::sync::{read, write};

/// Registry, attached listeners and subscription table behind one `trigger`.
///
/// Construct one with [`EventManager::new`] and pass it to the components
/// that need it. A process-wide instance is available through
/// `EventManager::instance()` when the `global` feature is enabled.
///
/// Attaching a manager to itself, directly or through a cycle, makes
/// `trigger` recurse without end.
#[derive(Default)]
pub struct EventManager {
    registry: ListenerRegistry,
    listeners: RwLock<Vec<Arc<dyn Triggerable>>>,
    subscriptions: RwLock<SubscriptionTable>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback on this manager's own registry.
    pub fn listen_to<F>(&self, key: impl Into<EventKey>, callback: F) -> EventResult<()>
    where
        F: Fn(&dyn Event) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.listen_to(key, callback)
    }

    /// See [`ListenerRegistry::register`].
    pub fn register(&self, key: impl Into<EventKey>, callback: Option<Callback>) -> EventResult<()> {
        self.registry.register(key, callback)
    }

    /// Callbacks registered directly on this manager that match `lookup`.
    ///
    /// Attached listeners and subscribers are not included.
    pub fn listeners_for(&self, lookup: impl Into<Ancestry>) -> Vec<Callback> {
        self.registry.listeners_for(lookup)
    }

    pub fn listeners_for_type<T: EventType>(&self) -> Vec<Callback> {
        self.registry.listeners_for_type::<T>()
    }

    /// Subscribe to one key or a list of keys.
    ///
    /// Keys accumulate across calls. The manager keeps only a weak reference:
    /// once the last `Arc` to the subscriber is dropped it stops receiving
    /// events.
    pub fn subscribe<S>(&self, subscriber: &Arc<S>, to: impl Into<Topics>) -> EventResult<()>
    where
        S: Publishable + 'static,
    {
        let weak: Weak<dyn Publishable> = Arc::downgrade(subscriber) as Weak<dyn Publishable>;
        self.subscribe_weak(SubscriberId::of(subscriber), weak, to.into())
    }

    /// [`subscribe`](Self::subscribe) for a subscriber already behind
    /// `Arc<dyn Publishable>`.
    ///
    /// Identity is the pointee, so the same subscriber reached through a
    /// concrete `Arc<S>` and through this call shares one subscription list.
    pub fn subscribe_dyn(
        &self,
        subscriber: &Arc<dyn Publishable>,
        to: impl Into<Topics>,
    ) -> EventResult<()> {
        self.subscribe_weak(SubscriberId::of(subscriber), Arc::downgrade(subscriber), to.into())
    }

    fn subscribe_weak(
        &self,
        id: SubscriberId,
        subscriber: Weak<dyn Publishable>,
        topics: Topics,
    ) -> EventResult<()> {
        debug!(topics = ?topics.keys(), "subscriber registered");
        write(&self.subscriptions).subscribe(id, subscriber, topics)
    }

    /// Drop every subscription of `subscriber` to `from`.
    ///
    /// Returns how many subscriptions were removed; subscriptions to other
    /// keys stay in place.
    pub fn unsubscribe<S>(&self, subscriber: &Arc<S>, from: impl Into<EventKey>) -> usize
    where
        S: ?Sized,
    {
        let key = from.into();
        let removed = write(&self.subscriptions).unsubscribe(SubscriberId::of(subscriber), &key);

        debug!(event_key = %key, removed, "subscriber unsubscribed");
        removed
    }

    /// Keys `subscriber` is subscribed to, in subscription order.
    pub fn subscriptions_of<S>(&self, subscriber: &Arc<S>) -> Vec<EventKey>
    where
        S: ?Sized,
    {
        read(&self.subscriptions).keys_of(SubscriberId::of(subscriber))
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        read(&self.subscriptions).len()
    }

    /// Forward every triggered event to `listener`, after this manager's own
    /// callbacks. The same listener may be attached more than once.
    pub fn attach_listener(&self, listener: Arc<dyn Triggerable>) {
        let mut listeners = write(&self.listeners);
        listeners.push(listener);
        debug!(attached = listeners.len(), "listener attached");
    }

    /// Remove the first attachment of `listener` (compared by identity).
    ///
    /// Returns `false` if it was not attached.
    pub fn detach_listener<L>(&self, listener: &Arc<L>) -> bool
    where
        L: ?Sized,
    {
        let target = Arc::as_ptr(listener).cast::<()>();
        let mut listeners = write(&self.listeners);

        let Some(index) = listeners
            .iter()
            .position(|attached| Arc::as_ptr(attached).cast::<()>() == target)
        else {
            return false;
        };
        listeners.remove(index);
        debug!(attached = listeners.len(), "listener detached");
        true
    }

    /// Attached listeners, in attachment order.
    pub fn listeners(&self) -> Vec<Arc<dyn Triggerable>> {
        read(&self.listeners).clone()
    }

    /// Dispatch `event` to callbacks, attached listeners, then subscribers.
    ///
    /// Attached listeners and subscribers are read when their phase starts,
    /// so a callback that detaches a listener or unsubscribes a subscriber
    /// keeps it out of this dispatch. A subscriber subscribed to several keys
    /// in the event's ancestry is notified once per matching key.
    pub fn trigger(&self, event: &dyn Event) -> HandlerResult {
        let ancestry = event.ancestry();
        trace!(event_key = %event.key(), "triggering event");

        let callbacks = self.registry.callbacks_for(&ancestry);
        registry::invoke(&callbacks, event)?;

        let listeners = self.listeners();
        trace!(listeners = listeners.len(), "forwarding to attached listeners");
        for listener in &listeners {
            listener.trigger(event)?;
        }

        let recipients = read(&self.subscriptions).recipients(&ancestry);
        trace!(subscribers = recipients.len(), "publishing to subscribers");
        for subscriber in &recipients {
            subscriber.publish(event)?;
        }

        Ok(())
    }
}

impl Triggerable for EventManager {
    fn trigger(&self, event: &dyn Event) -> HandlerResult {
        EventManager::trigger(self, event)
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("registry", &self.registry)
            .field("listeners", &read(&self.listeners).len())
            .field("subscriptions", &*read(&self.subscriptions))
            .finish()
    }
}
