//! Listener registry: event key → ordered callbacks.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use herald_core::{Ancestry, Event, EventError, EventKey, EventResult, EventType, HandlerResult};

use crate::capability::Triggerable;
use crate::sync::{read, write};

/// A registered callback.
pub type Callback = Arc<dyn Fn(&dyn Event) -> HandlerResult + Send + Sync>;

struct Entry {
    key: EventKey,
    callbacks: Vec<Callback>,
}

/// Maps event keys to the callbacks registered under them.
///
/// Keys keep the order in which they were first registered, callbacks keep
/// registration order within a key, and nothing is ever removed. A callback
/// registered under a supertype key is returned for every subtype.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: RwLock<Vec<Entry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `key`.
    ///
    /// `key` is a type's key (`SayHello::KEY`) or any string; the two forms
    /// are interchangeable.
    pub fn listen_to<F>(&self, key: impl Into<EventKey>, callback: F) -> EventResult<()>
    where
        F: Fn(&dyn Event) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(key, Some(Arc::new(callback)))
    }

    /// Register an already-shared callback.
    ///
    /// Fails with [`EventError::InvalidArgument`] and registers nothing when
    /// the callback is missing or the key is empty.
    pub fn register(&self, key: impl Into<EventKey>, callback: Option<Callback>) -> EventResult<()> {
        let key = key.into();
        let Some(callback) = callback else {
            return Err(EventError::invalid_argument(format!(
                "callback not given for `{key}`"
            )));
        };
        key.validate()?;

        let mut entries = write(&self.entries);
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.callbacks.push(callback),
            None => entries.push(Entry {
                key: key.clone(),
                callbacks: vec![callback],
            }),
        }
        drop(entries);

        debug!(event_key = %key, "listener registered");
        Ok(())
    }

    /// Callbacks matching a key, a type's ancestry or an event.
    ///
    /// A plain key matches only entries registered under exactly that key;
    /// an ancestry matches every entry whose key it contains. Results follow
    /// registry order.
    pub fn listeners_for(&self, lookup: impl Into<Ancestry>) -> Vec<Callback> {
        self.callbacks_for(&lookup.into())
    }

    pub fn listeners_for_type<T: EventType>(&self) -> Vec<Callback> {
        self.callbacks_for(&Ancestry::of::<T>())
    }

    /// Invoke every matching callback in order.
    ///
    /// The first failing callback's error is returned as is; the callbacks
    /// after it are not called.
    pub fn trigger(&self, event: &dyn Event) -> HandlerResult {
        let callbacks = self.callbacks_for(&event.ancestry());
        invoke(&callbacks, event)
    }

    /// Number of stored callbacks across all keys.
    pub fn len(&self) -> usize {
        read(&self.entries)
            .iter()
            .map(|entry| entry.callbacks.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered keys in registry order.
    pub fn keys(&self) -> Vec<EventKey> {
        read(&self.entries)
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    pub(crate) fn callbacks_for(&self, ancestry: &Ancestry) -> Vec<Callback> {
        read(&self.entries)
            .iter()
            .filter(|entry| ancestry.contains(&entry.key))
            .flat_map(|entry| entry.callbacks.iter().cloned())
            .collect()
    }
}

pub(crate) fn invoke(callbacks: &[Callback], event: &dyn Event) -> HandlerResult {
    trace!(event_key = %event.key(), callbacks = callbacks.len(), "invoking callbacks");
    for callback in callbacks {
        callback(event)?;
    }
    Ok(())
}

impl Triggerable for ListenerRegistry {
    fn trigger(&self, event: &dyn Event) -> HandlerResult {
        ListenerRegistry::trigger(self, event)
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = read(&self.entries);
        f.debug_map()
            .entries(entries.iter().map(|e| (e.key.as_str(), e.callbacks.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use herald_core::{NamedEvent, impl_event_type};

    #[derive(Debug)]
    struct Greeting;

    #[derive(Debug)]
    struct SayHello {
        output: Arc<Mutex<Vec<String>>>,
        name: String,
    }

    #[derive(Debug)]
    struct SayGoodBye;

    impl_event_type!(Greeting, "Greeting");
    impl_event_type!(SayHello, "SayHello", extends [Greeting]);
    impl_event_type!(SayGoodBye, "SayGoodBye");

    fn say_hello(output: &Arc<Mutex<Vec<String>>>, name: &str) -> SayHello {
        SayHello {
            output: Arc::clone(output),
            name: name.to_string(),
        }
    }

    fn greet(event: &dyn Event) -> HandlerResult {
        let hello = event
            .downcast_ref::<SayHello>()
            .ok_or_else(|| anyhow::anyhow!("expected SayHello, got {}", event.key()))?;
        hello.output.lock().unwrap().push(format!("hello {}", hello.name));
        Ok(())
    }

    #[test]
    fn type_and_string_keys_are_interchangeable() {
        let registry = ListenerRegistry::new();
        registry.listen_to(SayHello::KEY, |_| Ok(())).unwrap();
        registry.listen_to("SayHello", |_| Ok(())).unwrap();
        registry.listen_to(SayGoodBye::KEY, |_| Ok(())).unwrap();

        assert_eq!(registry.listeners_for_type::<SayHello>().len(), 2);
        assert_eq!(registry.listeners_for("SayHello").len(), 2);
        assert_eq!(registry.listeners_for_type::<SayGoodBye>().len(), 1);
        assert_eq!(registry.listeners_for("SayGoodBye").len(), 1);
        assert_eq!(registry.keys(), vec![SayHello::KEY, SayGoodBye::KEY]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn supertype_listener_receives_subtype_events() {
        let registry = ListenerRegistry::new();
        registry.listen_to(Greeting::KEY, |_| Ok(())).unwrap();
        registry.listen_to(SayHello::KEY, |_| Ok(())).unwrap();

        assert_eq!(registry.listeners_for_type::<SayHello>().len(), 2);
        assert_eq!(registry.listeners_for_type::<Greeting>().len(), 1);
        // A raw key is an exact match, not an ancestry walk.
        assert_eq!(registry.listeners_for("SayHello").len(), 1);
    }

    #[test]
    fn missing_callback_is_rejected() {
        let registry = ListenerRegistry::new();

        let err = registry.register("foo", None).unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument(_)));
        assert!(registry.is_empty());
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn empty_key_is_rejected() {
        let registry = ListenerRegistry::new();

        let err = registry.listen_to("", |_| Ok(())).unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn trigger_only_calls_matching_callbacks() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let registry = ListenerRegistry::new();

        registry.listen_to(SayHello::KEY, greet).unwrap();
        registry
            .listen_to("SayGoodBye", |_| Err(anyhow::anyhow!("must not run")))
            .unwrap();

        registry.trigger(&say_hello(&output, "foo")).unwrap();
        registry.trigger(&say_hello(&output, "bar")).unwrap();

        assert_eq!(*output.lock().unwrap(), vec!["hello foo", "hello bar"]);
    }

    #[test]
    fn shared_callbacks_can_be_registered() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let registry = ListenerRegistry::new();
        let callback: Callback = Arc::new(greet);

        registry.register(SayHello::KEY, Some(callback)).unwrap();
        registry.trigger(&say_hello(&output, "foo")).unwrap();

        assert_eq!(*output.lock().unwrap(), vec!["hello foo"]);
    }

    #[test]
    fn failing_callback_stops_the_rest() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = ListenerRegistry::new();

        for (label, fail) in [("first", false), ("second", true), ("third", false)] {
            let calls = Arc::clone(&calls);
            registry
                .listen_to("job.failed", move |_| {
                    calls.lock().unwrap().push(label);
                    if fail {
                        anyhow::bail!("{label} failed");
                    }
                    Ok(())
                })
                .unwrap();
        }

        let err = registry.trigger(&NamedEvent::new("job.failed")).unwrap_err();

        assert_eq!(err.to_string(), "second failed");
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn named_events_match_exact_keys_only() {
        let registry = ListenerRegistry::new();
        registry.listen_to("some-event", |_| Ok(())).unwrap();

        assert_eq!(registry.listeners_for(&NamedEvent::new("some-event") as &dyn Event).len(), 1);
        assert!(registry.listeners_for("some").is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: callbacks under one key fire in registration order.
            #[test]
            fn callbacks_fire_in_registration_order(count in 1usize..32) {
                let calls = Arc::new(Mutex::new(Vec::new()));
                let registry = ListenerRegistry::new();

                for i in 0..count {
                    let calls = Arc::clone(&calls);
                    registry
                        .listen_to("tick", move |_| {
                            calls.lock().unwrap().push(i);
                            Ok(())
                        })
                        .unwrap();
                }

                registry.trigger(&NamedEvent::new("tick")).unwrap();

                let expected: Vec<usize> = (0..count).collect();
                prop_assert_eq!(&*calls.lock().unwrap(), &expected);
            }
        }
    }
}
