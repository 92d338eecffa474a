//! Collaborator contracts.
//!
//! Anything that wants to receive events implements one of two small
//! capabilities:
//!
//! - [`Triggerable`]: receives every triggered event and applies its own
//!   matching (registries and managers are `Triggerable`, so they nest).
//! - [`Publishable`]: receives only the events it was subscribed to, through
//!   a manager's subscription table.
//!
//! Both return [`HandlerResult`]; an error stops the dispatch that delivered
//! the event and is handed back to whoever called `trigger`.

use std::sync::Arc;

use herald_core::{Event, HandlerResult};

/// An object an event manager can forward every triggered event to.
///
/// The trait requires `Send + Sync` so attached listeners can live inside the
/// process-wide manager.
pub trait Triggerable: Send + Sync {
    fn trigger(&self, event: &dyn Event) -> HandlerResult;
}

/// A subscriber, notified once per matching subscription key.
pub trait Publishable: Send + Sync {
    fn publish(&self, event: &dyn Event) -> HandlerResult;
}

impl<T> Triggerable for Arc<T>
where
    T: Triggerable + ?Sized,
{
    fn trigger(&self, event: &dyn Event) -> HandlerResult {
        (**self).trigger(event)
    }
}

impl<T> Publishable for Arc<T>
where
    T: Publishable + ?Sized,
{
    fn publish(&self, event: &dyn Event) -> HandlerResult {
        (**self).publish(event)
    }
}
