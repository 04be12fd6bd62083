//! Caller-thread dispatch.

use super::deliver_guarded;
use chorus_core::{DispatchError, DispatchPolicy, Invocation, Listeners, Policy};

/// Delivers on the caller's thread, in snapshot order.
///
/// The first failing listener stops the fan-out; its failure is returned to
/// the caller wrapped in [`DispatchError::Listener`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Direct;

impl<T: ?Sized> DispatchPolicy<T> for Direct {
    fn kind(&self) -> Policy {
        Policy::Direct
    }

    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError> {
        deliver_guarded(listeners, &invocation)
            .map_err(|source| DispatchError::listener(invocation.method(), source))
    }
}
