//! Subscription table: subscriber → ordered event keys.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use herald_core::{Ancestry, EventError, EventKey, EventResult};

use crate::capability::Publishable;

/// One or more event keys a subscriber is interested in.
///
/// Converts from a single key or string as well as from arrays and vectors of
/// them, so `subscribe(&s, "a")` and `subscribe(&s, ["a", "b"])` both work.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topics(Vec<EventKey>);

impl Topics {
    pub fn keys(&self) -> &[EventKey] {
        &self.0
    }

    pub fn into_keys(self) -> Vec<EventKey> {
        self.0
    }

    /// At least one key, and no empty key.
    pub fn validate(&self) -> EventResult<()> {
        if self.0.is_empty() {
            return Err(EventError::invalid_argument("subscription needs at least one event key"));
        }
        self.0.iter().try_for_each(EventKey::validate)
    }
}

impl From<EventKey> for Topics {
    fn from(value: EventKey) -> Self {
        Self(vec![value])
    }
}

impl From<&EventKey> for Topics {
    fn from(value: &EventKey) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<&str> for Topics {
    fn from(value: &str) -> Self {
        Self(vec![value.into()])
    }
}

impl From<String> for Topics {
    fn from(value: String) -> Self {
        Self(vec![value.into()])
    }
}

impl<K: Into<EventKey>> From<Vec<K>> for Topics {
    fn from(value: Vec<K>) -> Self {
        value.into_iter().collect()
    }
}

impl<K: Into<EventKey>, const N: usize> From<[K; N]> for Topics {
    fn from(value: [K; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<K: Into<EventKey>> FromIterator<K> for Topics {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Identity of a subscriber: the address of its shared allocation.
///
/// Stable for as long as a `Weak` to it exists, which the table guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubscriberId(usize);

impl SubscriberId {
    pub(crate) fn of<S: ?Sized>(subscriber: &Arc<S>) -> Self {
        Self(Arc::as_ptr(subscriber).cast::<()>() as usize)
    }
}

struct Subscription {
    id: SubscriberId,
    subscriber: Weak<dyn Publishable>,
    keys: Vec<EventKey>,
}

impl Subscription {
    fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }
}

/// Maps subscribers, by identity, to the keys they subscribed to.
///
/// Subscribers are held weakly; dropping the last `Arc` to a subscriber ends
/// its subscriptions. Subscribers keep the order of their first
/// subscription, and keys keep the order they were added in.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    entries: Vec<Subscription>,
}

impl SubscriptionTable {
    /// Append `topics` to the subscriber's keys.
    pub(crate) fn subscribe(
        &mut self,
        id: SubscriberId,
        subscriber: Weak<dyn Publishable>,
        topics: Topics,
    ) -> EventResult<()> {
        topics.validate()?;
        self.prune();

        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.keys.extend(topics.into_keys()),
            None => self.entries.push(Subscription {
                id,
                subscriber,
                keys: topics.into_keys(),
            }),
        }
        Ok(())
    }

    /// Remove every key of the subscriber equal to `key`.
    ///
    /// Returns how many keys were removed. A subscriber left without keys is
    /// dropped from the table.
    pub(crate) fn unsubscribe(&mut self, id: SubscriberId, key: &EventKey) -> usize {
        self.prune();

        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return 0;
        };
        let before = entry.keys.len();
        entry.keys.retain(|k| k != key);
        let removed = before - entry.keys.len();

        self.entries.retain(|entry| !entry.keys.is_empty());
        removed
    }

    pub(crate) fn keys_of(&self, id: SubscriberId) -> Vec<EventKey> {
        self.entries
            .iter()
            .find(|entry| entry.id == id && entry.is_alive())
            .map(|entry| entry.keys.clone())
            .unwrap_or_default()
    }

    /// Subscribers to notify for an event with this ancestry.
    ///
    /// A subscriber appears once per matching key, in subscription order.
    pub(crate) fn recipients(&self, ancestry: &Ancestry) -> Vec<Arc<dyn Publishable>> {
        let mut recipients = Vec::new();
        for entry in &self.entries {
            let Some(subscriber) = entry.subscriber.upgrade() else {
                trace!("skipping dropped subscriber");
                continue;
            };
            for key in entry.keys.iter().filter(|key| ancestry.contains(key)) {
                trace!(event_key = %key, "subscription matched");
                recipients.push(Arc::clone(&subscriber));
            }
        }
        recipients
    }

    /// Number of live subscribers.
    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_alive()).count()
    }

    fn prune(&mut self) {
        self.entries.retain(Subscription::is_alive);
    }
}

impl fmt::Debug for SubscriptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.keys))
            .finish()
    }
}
