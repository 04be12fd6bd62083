//! A captured call on a dispatch handle.

use crate::error::{BoxError, ListenerFailure};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// The return type of capability methods.
pub type ListenerResult = Result<(), BoxError>;

/// One call made on a dispatch handle: the method name plus its arguments,
/// captured in a closure that replays the call on a single listener.
///
/// Invocations are immutable once created and cheap to clone, so one
/// invocation can be shipped to any number of threads.
pub struct Invocation<T: ?Sized> {
    method: &'static str,
    call: Arc<dyn Fn(&T) -> ListenerResult + Send + Sync>,
}

impl<T: ?Sized> Invocation<T> {
    /// Captures a call to `method`.
    pub fn new<F>(method: &'static str, call: F) -> Self
    where
        F: Fn(&T) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            method,
            call: Arc::new(call),
        }
    }

    /// The name of the called method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Replays the call on one listener.
    ///
    /// Panics raised by the listener are caught and reported as
    /// [`ListenerFailure::Panicked`].
    pub fn apply(&self, listener: &T) -> Result<(), ListenerFailure> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.call)(listener))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ListenerFailure::Error(err)),
            Err(payload) => Err(ListenerFailure::from_panic(payload)),
        }
    }
}

impl<T: ?Sized> Clone for Invocation<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            call: Arc::clone(&self.call),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Invocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
