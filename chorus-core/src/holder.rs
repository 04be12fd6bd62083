//! # Listener collections
//!
//! A [`CollectionHolder`] owns (or observes) the set of registered listeners.
//! Dispatch handles never keep their own copy of the set: every fire asks the
//! holder for a fresh [`Listeners`] iterator, so registrations are visible to
//! the very next call.
//!
//! Listeners are compared by allocation identity, never by value. Two
//! `Arc`s pointing at the same allocation are the same listener.

use crate::error::ReadOnlyViolation;
use std::{ptr, sync::Arc};

/// A snapshot iterator over registered listeners.
///
/// The iterator owns everything it needs, so it can be moved to another
/// thread and consumed after the holder has changed.
pub type Listeners<T> = Box<dyn Iterator<Item = Arc<T>> + Send + 'static>;

/// Storage for registered listeners.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot hold listeners of type `{T}`",
    label = "missing `CollectionHolder` implementation"
)]
pub trait CollectionHolder<T: ?Sized>: Send + Sync {
    /// Adds a listener. Registering a listener twice is a no-op.
    fn register(&self, listener: Arc<T>) -> Result<(), ReadOnlyViolation>;

    /// Removes a listener. Unregistering an unknown listener is a no-op.
    fn unregister(&self, listener: &Arc<T>) -> Result<(), ReadOnlyViolation>;

    /// Returns the listeners that a dispatch started now would visit.
    ///
    /// Mutations made after this call never affect the returned iterator.
    fn iter(&self) -> Listeners<T>;

    /// Number of listeners the next [`iter`](CollectionHolder::iter) would yield.
    fn size(&self) -> usize;

    /// Returns `true` if the next iteration would be empty.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// A predicate selecting a subset of listeners.
///
/// Any `Fn(&Arc<T>) -> bool` closure is a filter, so identity filters read
/// naturally: `support.filter(move |l| Arc::ptr_eq(l, &a))`.
pub trait ListenerFilter<T: ?Sized>: Send + Sync {
    /// Returns `true` if `listener` belongs to the filtered view.
    fn passes_filter(&self, listener: &Arc<T>) -> bool;
}

impl<T, F> ListenerFilter<T> for F
where
    T: ?Sized,
    F: Fn(&Arc<T>) -> bool + Send + Sync,
{
    fn passes_filter(&self, listener: &Arc<T>) -> bool {
        self(listener)
    }
}

/// Returns `true` if both handles point at the same listener.
///
/// Only the data address is compared; vtable pointers of the same object may
/// differ between codegen units.
pub fn same_listener<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Fixed(&'static str);

    impl Named for Fixed {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_identity_not_equality() {
        let a: Arc<dyn Named> = Arc::new(Fixed("same"));
        let b: Arc<dyn Named> = Arc::new(Fixed("same"));
        assert!(same_listener(&a, &a.clone()));
        assert!(!same_listener(&a, &b));
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn test_closure_is_filter() {
        let a: Arc<dyn Named> = Arc::new(Fixed("a"));
        let b: Arc<dyn Named> = Arc::new(Fixed("b"));
        let filter = |l: &Arc<dyn Named>| l.name() == "a";
        assert!(filter.passes_filter(&a));
        assert!(!filter.passes_filter(&b));
    }
}
