//! Explicit "is-a" relation between event categories.

use crate::event::{Event, EventType};
use crate::key::EventKey;

/// Ordered list of keys an event conforms to.
///
/// The first key is the event's own key; the rest are its declared
/// supertypes, nearest first, collected transitively. A key appears at most
/// once (diamond-shaped hierarchies keep the first occurrence).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ancestry {
    keys: Vec<EventKey>,
}

impl Ancestry {
    /// Ancestry with a single key and no supertypes.
    pub fn root(key: impl Into<EventKey>) -> Self {
        Self {
            keys: vec![key.into()],
        }
    }

    /// Ancestry of a declared event type.
    pub fn of<T: EventType>() -> Self {
        T::lineage()
    }

    /// Append every key of `parent` that is not already present.
    pub fn inherit(mut self, parent: Ancestry) -> Self {
        for key in parent.keys {
            self.push(key);
        }
        self
    }

    /// Declare conformance to a category that has no Rust type behind it.
    pub fn conforms_to(mut self, key: impl Into<EventKey>) -> Self {
        self.push(key.into());
        self
    }

    /// The event's own key.
    pub fn key(&self) -> Option<&EventKey> {
        self.keys.first()
    }

    pub fn contains(&self, key: &EventKey) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn push(&mut self, key: EventKey) {
        if !self.contains(&key) {
            self.keys.push(key);
        }
    }
}

impl<'a> IntoIterator for &'a Ancestry {
    type Item = &'a EventKey;
    type IntoIter = std::slice::Iter<'a, EventKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl From<EventKey> for Ancestry {
    fn from(value: EventKey) -> Self {
        Self::root(value)
    }
}

impl From<&EventKey> for Ancestry {
    fn from(value: &EventKey) -> Self {
        Self::root(value.clone())
    }
}

impl From<&str> for Ancestry {
    fn from(value: &str) -> Self {
        Self::root(value)
    }
}

impl From<String> for Ancestry {
    fn from(value: String) -> Self {
        Self::root(value)
    }
}

impl From<&dyn Event> for Ancestry {
    fn from(value: &dyn Event) -> Self {
        value.ancestry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_holds_only_its_own_key() {
        let ancestry = Ancestry::root("SayHello");
        assert_eq!(ancestry.len(), 1);
        assert_eq!(ancestry.key(), Some(&EventKey::from("SayHello")));
    }

    #[test]
    fn inherit_keeps_first_occurrence_of_shared_supertypes() {
        let base = Ancestry::root("Event");
        let left = Ancestry::root("Greeting").inherit(base.clone());
        let right = Ancestry::root("Audited").inherit(base);

        let ancestry = Ancestry::root("SayHello").inherit(left).inherit(right);
        let keys: Vec<&str> = ancestry.iter().map(EventKey::as_str).collect();

        assert_eq!(keys, vec!["SayHello", "Greeting", "Event", "Audited"]);
    }

    #[test]
    fn conforms_to_adds_untyped_category() {
        let ancestry = Ancestry::root("SayHello").conforms_to("loggable");
        assert!(ancestry.contains(&EventKey::from("loggable")));
        assert!(!ancestry.contains(&EventKey::from("Loggable")));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: own key stays first and no key is listed twice.
            #[test]
            fn inherit_never_duplicates_keys(
                own in "[A-Z][a-z]{0,8}",
                parents in proptest::collection::vec("[A-Z][a-z]{0,3}", 0..12)
            ) {
                let mut ancestry = Ancestry::root(own.as_str());
                for parent in &parents {
                    ancestry = ancestry.inherit(Ancestry::root(parent.as_str()));
                }

                prop_assert_eq!(ancestry.key().map(EventKey::as_str), Some(own.as_str()));

                let mut seen = std::collections::HashSet::new();
                for key in &ancestry {
                    prop_assert!(seen.insert(key.clone()));
                }
                for parent in &parents {
                    prop_assert!(ancestry.contains(&EventKey::from(parent.as_str())));
                }
            }
        }
    }
}
