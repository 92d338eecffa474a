//! Process-wide event manager.
//!
//! Prefer constructing an [`EventManager`] and passing it around; this
//! accessor exists for code that cannot be handed one. The instance is
//! created on first use and lives until the process exits.

use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::manager::EventManager;

static INSTANCE: LazyLock<Arc<EventManager>> = LazyLock::new(|| {
    debug!("process-wide event manager created");
    Arc::new(EventManager::new())
});

impl EventManager {
    /// The process-wide instance. Every call returns the same manager.
    pub fn instance() -> Arc<EventManager> {
        Arc::clone(&INSTANCE)
    }
}

/// Gives a type access to the process-wide [`EventManager`].
///
/// ```
/// use herald_events::{EventManager, EventManagerAware};
/// use std::sync::Arc;
///
/// struct Mailer;
/// impl EventManagerAware for Mailer {}
///
/// assert!(Arc::ptr_eq(&Mailer.event_manager(), &EventManager::instance()));
/// ```
pub trait EventManagerAware {
    fn event_manager(&self) -> Arc<EventManager> {
        EventManager::instance()
    }
}
