use std::any::Any;
use std::fmt;

use crate::ancestry::Ancestry;
use crate::key::EventKey;

/// An event as seen by the dispatch machinery.
///
/// The library never looks at payloads: it only needs the event's ancestry
/// to decide who gets notified. Handlers recover the concrete type with
/// [`downcast_ref`](#method.downcast_ref).
///
/// Every [`EventType`] is an `Event`; implement this trait directly only for
/// events whose identity is decided at run time (see [`NamedEvent`]).
pub trait Event: Any + fmt::Debug + 'static {
    /// Key of the event's own category.
    fn key(&self) -> EventKey;

    /// Own key followed by every supertype key.
    fn ancestry(&self) -> Ancestry;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// True if `key` is the event's own key or one of its supertypes.
    pub fn is_a(&self, key: &EventKey) -> bool {
        self.ancestry().contains(key)
    }
}

/// A concrete event type with a compile-time identity.
///
/// The is-a relation is declared, not discovered: override [`lineage`] to
/// inherit the ancestry of parent types, or use [`impl_event_type!`].
///
/// [`lineage`]: EventType::lineage
/// [`impl_event_type!`]: crate::impl_event_type
pub trait EventType: Any + fmt::Debug + 'static {
    const KEY: EventKey;

    fn lineage() -> Ancestry {
        Ancestry::root(Self::KEY)
    }
}

impl<T: EventType> Event for T {
    fn key(&self) -> EventKey {
        T::KEY
    }

    fn ancestry(&self) -> Ancestry {
        T::lineage()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Payload-less event identified by a run-time key.
///
/// Matches only registrations made under exactly that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEvent {
    key: EventKey,
}

impl NamedEvent {
    pub fn new(key: impl Into<EventKey>) -> Self {
        Self { key: key.into() }
    }

    pub fn name(&self) -> &EventKey {
        &self.key
    }
}

impl Event for NamedEvent {
    fn key(&self) -> EventKey {
        self.key.clone()
    }

    fn ancestry(&self) -> Ancestry {
        Ancestry::root(self.key.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Declare an [`EventType`] and its supertypes.
///
/// ```
/// use herald_core::{impl_event_type, Ancestry, EventKey};
///
/// #[derive(Debug)]
/// struct Greeting;
/// #[derive(Debug)]
/// struct SayHello { name: String }
///
/// impl_event_type!(Greeting, "Greeting");
/// impl_event_type!(SayHello, "SayHello", extends [Greeting]);
///
/// assert!(Ancestry::of::<SayHello>().contains(&EventKey::from("Greeting")));
/// ```
#[macro_export]
macro_rules! impl_event_type {
    ($t:ty, $key:literal) => {
        impl $crate::EventType for $t {
            const KEY: $crate::EventKey = $crate::EventKey::from_static($key);
        }
    };
    ($t:ty, $key:literal, extends [$($parent:ty),+ $(,)?]) => {
        impl $crate::EventType for $t {
            const KEY: $crate::EventKey = $crate::EventKey::from_static($key);

            fn lineage() -> $crate::Ancestry {
                $crate::Ancestry::root(Self::KEY)
                    $(.inherit(<$parent as $crate::EventType>::lineage()))+
            }
        }
    };
}
