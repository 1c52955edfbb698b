//! Store change notification
//!
//! A process-global listener slot so UI layers can refresh cached state
//! after a store write without polling.

use parking_lot::RwLock;
use std::sync::OnceLock;

/// Events broadcast after store writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Profile collection changed
    ProfilesUpdated,
    /// The encrypted wallet bundle was written or deleted
    WalletsChanged,
    /// All cached unlock credentials were cleared
    CredentialsCleared,
}

type Listener = Box<dyn Fn(StoreEvent) + Send + Sync>;

static LISTENERS: OnceLock<RwLock<Vec<Listener>>> = OnceLock::new();

fn listeners() -> &'static RwLock<Vec<Listener>> {
    LISTENERS.get_or_init(|| RwLock::new(Vec::new()))
}

/// Register a listener for store events
pub fn subscribe<F>(listener: F)
where
    F: Fn(StoreEvent) + Send + Sync + 'static,
{
    listeners().write().push(Box::new(listener));
}

/// Drop all registered listeners
pub fn clear_listeners() {
    listeners().write().clear();
}

/// Broadcast an event to every registered listener
pub fn emit(event: StoreEvent) {
    for listener in listeners().read().iter() {
        listener(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribe_and_emit() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        subscribe(move |event| {
            if event == StoreEvent::ProfilesUpdated {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        emit(StoreEvent::ProfilesUpdated);
        assert!(seen.load(Ordering::SeqCst) >= 1);
    }
}
