//! Copy-on-write holder of strongly referenced listeners.

use arc_swap::ArcSwap;
use chorus_core::{CollectionHolder, Listeners, ReadOnlyViolation, same_listener};
use std::sync::Arc;

/// A holder that keeps its listeners alive until they are unregistered.
///
/// The set is an immutable `Vec` swapped atomically on every mutation.
/// Iteration clones one `Arc` and never blocks writers; writers never block
/// each other for longer than one compare-and-swap retry.
pub struct StrongHolder<T: ?Sized> {
    entries: ArcSwap<Vec<Arc<T>>>,
}

impl<T: ?Sized> StrongHolder<T> {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Returns `true` if `listener` is registered.
    pub fn contains(&self, listener: &Arc<T>) -> bool {
        self.entries
            .load()
            .iter()
            .any(|entry| same_listener(entry, listener))
    }
}

impl<T: ?Sized> Default for StrongHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> CollectionHolder<T> for StrongHolder<T> {
    fn register(&self, listener: Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.entries.rcu(|current| {
            if current.iter().any(|entry| same_listener(entry, &listener)) {
                return Arc::clone(current);
            }
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&listener));
            Arc::new(next)
        });
        Ok(())
    }

    fn unregister(&self, listener: &Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.entries.rcu(|current| {
            if !current.iter().any(|entry| same_listener(entry, listener)) {
                return Arc::clone(current);
            }
            let next: Vec<Arc<T>> = current
                .iter()
                .filter(|entry| !same_listener(entry, listener))
                .cloned()
                .collect();
            Arc::new(next)
        });
        Ok(())
    }

    fn iter(&self) -> Listeners<T> {
        let snapshot = self.entries.load_full();
        Box::new((0..snapshot.len()).map(move |i| Arc::clone(&snapshot[i])))
    }

    fn size(&self) -> usize {
        self.entries.load().len()
    }
}
