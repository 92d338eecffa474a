//! Event keys: the string identity events are registered and matched under.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EventError, EventResult};

/// Identifier of an event category (e.g. `"SayHello"` or `"user.created"`).
///
/// Two keys are equal iff their strings are equal, regardless of whether
/// they were built from a static string or an owned one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(Cow<'static, str>);

impl EventKey {
    /// Build a key from a string literal. Usable in `const` position.
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject empty keys; used by every registration entry point.
    pub fn validate(&self) -> EventResult<()> {
        if self.is_empty() {
            return Err(EventError::invalid_argument("event key must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventKey {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&String> for EventKey {
    fn from(value: &String) -> Self {
        Self::new(value.as_str())
    }
}

impl From<&EventKey> for EventKey {
    fn from(value: &EventKey) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for EventKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for EventKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
