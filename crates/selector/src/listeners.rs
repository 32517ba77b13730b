use std::sync::Arc;

use parking_lot::RwLock;
use scene::selection::{SelectionMode, SelectionSet};

/// Receives every applied selection transaction.
///
/// Both callbacks run synchronously on the thread that applied the
/// transaction, while the selection lock is held. Reading the selection from
/// a callback is fine; modifying it is not.
pub trait SelectedSourcesListener: Send + Sync {
    /// The full selection after the transaction.
    fn selection_updated(&self, selection: &SelectionSet, origin: &str);

    /// What the transaction changed, called right after `selection_updated`.
    fn last_event(&self, delta: &SelectionSet, mode: SelectionMode, origin: &str);
}

/// Notified when selection mode is switched on or off.
pub trait ToggleListener: Send + Sync {
    fn enabled(&self);

    fn disabled(&self);
}

/// Registry of shared listener capabilities.
///
/// Ordering contract:
/// - `snapshot` returns listeners in registration order.
pub struct Listeners<T: ?Sized> {
    entries: RwLock<Vec<Arc<T>>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

impl<T: ?Sized> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<T>) {
        self.entries.write().push(listener);
    }

    /// Removes `listener` by identity. Returns `false` if it was not registered.
    pub fn remove(&self, listener: &Arc<T>) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|l| !std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)));
        entries.len() != before
    }

    /// Copy of the current registrations, for dispatch without holding the lock.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Listeners, ToggleListener};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ToggleListener for Counter {
        fn enabled(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn disabled(&self) {}
    }

    #[test]
    fn removes_by_identity_only() {
        let listeners: Listeners<dyn ToggleListener> = Listeners::new();
        let a: Arc<dyn ToggleListener> = Arc::new(Counter::default());
        let b: Arc<dyn ToggleListener> = Arc::new(Counter::default());
        listeners.add(a.clone());
        listeners.add(b.clone());

        assert!(listeners.remove(&a));
        assert!(!listeners.remove(&a));
        assert_eq!(listeners.len(), 1);

        for l in listeners.snapshot() {
            l.enabled();
        }
        assert!(listeners.remove(&b));
        assert!(listeners.is_empty());
    }
}
