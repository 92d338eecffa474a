//! `herald-events`: synchronous in-process event dispatch.
//!
//! - [`ListenerRegistry`]: callbacks keyed by event key, matched against an
//!   event's ancestry.
//! - [`EventManager`]: a registry, attached [`Triggerable`] listeners and a
//!   table of [`Publishable`] subscribers behind a single `trigger`.
//! - `EventManager::instance()` / [`EventManagerAware`]: an optional
//!   process-wide manager (feature `global`, on by default).
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use herald_events::{impl_event_type, Event, EventManager, EventType};
//!
//! #[derive(Debug)]
//! struct Greeting;
//! #[derive(Debug)]
//! struct SayHello { name: String }
//!
//! impl_event_type!(Greeting, "Greeting");
//! impl_event_type!(SayHello, "SayHello", extends [Greeting]);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let manager = EventManager::new();
//!
//! let sink = Arc::clone(&seen);
//! manager.listen_to(Greeting::KEY, move |event: &dyn Event| {
//!     if let Some(hello) = event.downcast_ref::<SayHello>() {
//!         sink.lock().unwrap().push(hello.name.clone());
//!     }
//!     Ok(())
//! })?;
//!
//! manager.trigger(&SayHello { name: "foo".into() })?;
//! assert_eq!(*seen.lock().unwrap(), vec!["foo"]);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod capability;
mod manager;
mod registry;
mod subscription;
mod sync;

#[cfg(feature = "global")]
mod global;

pub use capability::{Publishable, Triggerable};
pub use manager::EventManager;
pub use registry::{Callback, ListenerRegistry};
pub use subscription::Topics;

#[cfg(feature = "global")]
pub use global::EventManagerAware;

pub use herald_core::{
    Ancestry, Event, EventError, EventKey, EventResult, EventType, HandlerResult, NamedEvent,
    impl_event_type,
};
