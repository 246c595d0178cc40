//! Registration handles

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::handler::Handler;

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// A handler together with the identity used to remove it again
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) id: u64,
    pub(crate) handler: Handler,
}

impl Entry {
    pub(crate) fn new(handler: Handler) -> Self {
        Self {
            id: NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed),
            handler,
        }
    }
}

/// Ordered handlers registered for one protocol
pub(crate) type HandlerList = Arc<RwLock<Vec<Entry>>>;

/// One or more handlers for a protocol
#[derive(Debug, Clone)]
pub enum HandlerSet {
    One(Handler),
    Many(Vec<Handler>),
}

impl From<Handler> for HandlerSet {
    fn from(handler: Handler) -> Self {
        Self::One(handler)
    }
}

impl From<Vec<Handler>> for HandlerSet {
    fn from(handlers: Vec<Handler>) -> Self {
        Self::Many(handlers)
    }
}

/// Protocol name to handler(s)
pub type HandlerMap = IndexMap<String, HandlerSet>;

/// Handle returned by registration; removes its handler when asked.
///
/// The handle holds the protocol's handler list weakly, so it never keeps
/// a dropped resolver's state alive.
#[derive(Debug)]
pub struct Registration {
    protocol: String,
    id: u64,
    handlers: Weak<RwLock<Vec<Entry>>>,
    removed: AtomicBool,
}

impl Registration {
    pub(crate) fn new(protocol: &str, id: u64, handlers: &HandlerList) -> Self {
        Self {
            protocol: protocol.to_string(),
            id,
            handlers: Arc::downgrade(handlers),
            removed: AtomicBool::new(false),
        }
    }

    /// Protocol the handler was registered under
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Remove the handler from its protocol's chain.
    ///
    /// Returns the removed handler on the first call and `None` on every
    /// later call.
    pub fn unregister(&self) -> Option<Handler> {
        if self.removed.swap(true, Ordering::AcqRel) {
            return None;
        }
        let handlers = self.handlers.upgrade()?;
        let mut handlers = handlers.write();
        let index = handlers.iter().position(|entry| entry.id == self.id)?;
        tracing::debug!(protocol = %self.protocol, "Unregistered handler");
        Some(handlers.remove(index).handler)
    }

    /// Whether the handler is still part of its chain
    pub fn is_active(&self) -> bool {
        !self.removed.load(Ordering::Acquire) && self.handlers.strong_count() > 0
    }
}

/// Handles returned for one protocol of a [`HandlerMap`]
#[derive(Debug)]
pub enum Registrations {
    One(Registration),
    Many(Vec<Registration>),
}

impl Registrations {
    /// Unregister every handler behind these handles, returning how many
    /// were removed by this call.
    pub fn unregister(&self) -> usize {
        match self {
            Self::One(registration) => usize::from(registration.unregister().is_some()),
            Self::Many(registrations) => registrations
                .iter()
                .filter(|registration| registration.unregister().is_some())
                .count(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(registrations) => registrations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
