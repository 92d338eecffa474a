//! `herald-core`: event identity primitives.
//!
//! Keys, the explicit is-a relation between event categories, the `Event`
//! traits and the error model shared by the dispatch crates.

pub mod ancestry;
pub mod error;
pub mod event;
pub mod key;

pub use ancestry::Ancestry;
pub use error::{EventError, EventResult, HandlerResult};
pub use event::{Event, EventType, NamedEvent};
pub use key::EventKey;
