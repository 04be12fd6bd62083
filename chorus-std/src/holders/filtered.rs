//! Read-only filtered view over another holder.

use chorus_core::{CollectionHolder, ListenerFilter, Listeners, Mutation, ReadOnlyViolation};
use std::sync::Arc;

/// A holder exposing the subset of a base holder accepted by a filter.
///
/// Nothing is cached: every iteration runs the filter over a fresh snapshot
/// of the base holder, so registrations on the base are visible immediately.
/// The view itself cannot be mutated.
pub struct FilteredHolder<T: ?Sized> {
    base: Arc<dyn CollectionHolder<T>>,
    filter: Arc<dyn ListenerFilter<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> FilteredHolder<T> {
    /// Creates a view of `base` restricted by `filter`.
    pub fn new(base: Arc<dyn CollectionHolder<T>>, filter: Arc<dyn ListenerFilter<T>>) -> Self {
        Self { base, filter }
    }
}

impl<T: ?Sized + Send + Sync + 'static> CollectionHolder<T> for FilteredHolder<T> {
    fn register(&self, _listener: Arc<T>) -> Result<(), ReadOnlyViolation> {
        Err(ReadOnlyViolation::new(Mutation::Register))
    }

    fn unregister(&self, _listener: &Arc<T>) -> Result<(), ReadOnlyViolation> {
        Err(ReadOnlyViolation::new(Mutation::Unregister))
    }

    fn iter(&self) -> Listeners<T> {
        let filter = Arc::clone(&self.filter);
        Box::new(
            self.base
                .iter()
                .filter(move |listener| filter.passes_filter(listener)),
        )
    }

    fn size(&self) -> usize {
        self.iter().count()
    }
}
