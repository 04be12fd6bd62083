//! Holder of weakly referenced listeners.

use arc_swap::ArcSwap;
use chorus_core::{CollectionHolder, Listeners, ReadOnlyViolation};
use std::{
    ptr,
    sync::{Arc, Weak},
};

/// A holder that does not keep its listeners alive.
///
/// A listener stays registered only while some other part of the program
/// owns an `Arc` to it. Entries whose listener has been dropped are pruned
/// before every [`iter`](CollectionHolder::iter) and
/// [`size`](CollectionHolder::size), and the iterator upgrades each entry as
/// it goes, so a dropped listener is never called.
pub struct WeakHolder<T: ?Sized> {
    entries: ArcSwap<Vec<Weak<T>>>,
}

impl<T: ?Sized> WeakHolder<T> {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Removes entries whose listener has been dropped.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self) -> usize {
        if self.entries.load().iter().all(is_live) {
            return 0;
        }
        let before = self.entries.rcu(|current| {
            let next: Vec<Weak<T>> = current.iter().filter(|w| is_live(w)).cloned().collect();
            Arc::new(next)
        });
        let removed = before.iter().filter(|w| !is_live(w)).count();
        if removed > 0 {
            tracing::debug!(removed, "pruned dropped listeners");
        }
        removed
    }
}

impl<T: ?Sized> Default for WeakHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_live<T: ?Sized>(entry: &Weak<T>) -> bool {
    entry.strong_count() > 0
}

// A dead `Weak` still pins its allocation, so its address cannot be reused
// by a new listener while the entry exists.
fn points_to<T: ?Sized>(entry: &Weak<T>, listener: &Arc<T>) -> bool {
    ptr::addr_eq(entry.as_ptr(), Arc::as_ptr(listener))
}

impl<T: ?Sized + Send + Sync + 'static> CollectionHolder<T> for WeakHolder<T> {
    fn register(&self, listener: Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.entries.rcu(|current| {
            if current.iter().any(|entry| points_to(entry, &listener)) {
                return Arc::clone(current);
            }
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::downgrade(&listener));
            Arc::new(next)
        });
        Ok(())
    }

    fn unregister(&self, listener: &Arc<T>) -> Result<(), ReadOnlyViolation> {
        self.entries.rcu(|current| {
            if !current.iter().any(|entry| points_to(entry, listener)) {
                return Arc::clone(current);
            }
            let next: Vec<Weak<T>> = current
                .iter()
                .filter(|entry| !points_to(entry, listener))
                .cloned()
                .collect();
            Arc::new(next)
        });
        Ok(())
    }

    fn iter(&self) -> Listeners<T> {
        self.prune();
        let snapshot = self.entries.load_full();
        Box::new((0..snapshot.len()).filter_map(move |i| snapshot[i].upgrade()))
    }

    fn size(&self) -> usize {
        self.prune();
        self.entries.load().iter().filter(|w| is_live(w)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Sink: Send + Sync {
        fn id(&self) -> usize;
    }

    struct Id(usize);

    impl Sink for Id {
        fn id(&self) -> usize {
            self.0
        }
    }

    fn listener_with_id(id: usize) -> Arc<dyn Sink> {
        Arc::new(Id(id))
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let holder = WeakHolder::<dyn Sink>::new();
        let kept = listener_with_id(1);
        let dropped = listener_with_id(2);
        holder.register(kept.clone()).unwrap();
        holder.register(dropped.clone()).unwrap();
        assert_eq!(holder.size(), 2);

        drop(dropped);
        assert_eq!(holder.size(), 1);
        let ids: Vec<usize> = holder.iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_holder_does_not_keep_listener_alive() {
        let holder = WeakHolder::<dyn Sink>::new();
        let listener = listener_with_id(7);
        holder.register(listener.clone()).unwrap();
        assert_eq!(Arc::strong_count(&listener), 1);
    }

    #[test]
    fn test_snapshot_skips_listener_dropped_mid_iteration() {
        let holder = WeakHolder::<dyn Sink>::new();
        let first = listener_with_id(1);
        let second = listener_with_id(2);
        holder.register(first.clone()).unwrap();
        holder.register(second.clone()).unwrap();

        let mut snapshot = holder.iter();
        assert_eq!(snapshot.next().map(|l| l.id()), Some(1));
        drop(second);
        assert!(snapshot.next().is_none());
    }

    #[test]
    fn test_unregister_and_reregister() {
        let holder = WeakHolder::<dyn Sink>::new();
        let listener = listener_with_id(3);
        holder.register(listener.clone()).unwrap();
        holder.register(listener.clone()).unwrap();
        assert_eq!(holder.size(), 1);
        holder.unregister(&listener).unwrap();
        assert!(holder.is_empty());
        holder.register(listener.clone()).unwrap();
        assert_eq!(holder.size(), 1);
    }

    #[test]
    fn test_prune_reports_removed_count() {
        let holder = WeakHolder::<dyn Sink>::new();
        for id in 0..4 {
            holder.register(listener_with_id(id)).unwrap();
        }
        assert_eq!(holder.prune(), 4);
        assert_eq!(holder.prune(), 0);
    }
}
