//! Dispatch handles.

use chorus_core::{CollectionHolder, DispatchError, DispatchPolicy, Invocation, Policy};
use std::{fmt, sync::Arc};

/// A callable stand-in for every registered listener.
///
/// `#[chorus::capability]` implements the listener trait for
/// `Handle<dyn Trait>`; each trait method call captures one [`Invocation`]
/// and hands it, together with a fresh snapshot of the listeners, to the
/// bound policy.
///
/// Handles are obtained from
/// [`ListenerSupport::handle_for`](crate::ListenerSupport::handle_for) and
/// its shortcuts.
pub struct Handle<T: ?Sized> {
    holder: Arc<dyn CollectionHolder<T>>,
    policy: Arc<dyn DispatchPolicy<T>>,
}

impl<T: ?Sized> Handle<T> {
    pub(crate) fn new(
        holder: Arc<dyn CollectionHolder<T>>,
        policy: Arc<dyn DispatchPolicy<T>>,
    ) -> Self {
        Self { holder, policy }
    }

    /// The policy this handle dispatches with.
    pub fn policy(&self) -> Policy {
        self.policy.kind()
    }

    /// Delivers `invocation` to the current listeners.
    ///
    /// Called by the generated trait implementation; one call is exactly one
    /// fan-out.
    pub fn dispatch(&self, invocation: Invocation<T>) -> Result<(), DispatchError> {
        tracing::trace!(
            policy = %self.policy.kind(),
            method = invocation.method(),
            "dispatching invocation"
        );
        self.policy.dispatch(self.holder.iter(), invocation)
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("policy", &self.policy.kind())
            .finish_non_exhaustive()
    }
}
