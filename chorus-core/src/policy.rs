//! Dispatch policy traits.

use crate::{error::DispatchError, holder::Listeners, invocation::Invocation};
use std::fmt;

/// The execution policies a dispatch handle can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Sequential on the caller's thread; the first failure is returned.
    Direct,
    /// Sequential on the designated thread; the caller waits for the result.
    DeferredWait,
    /// Sequential on the designated thread; the caller does not wait.
    DeferredAsync,
    /// Sequential on a freshly spawned thread; the caller does not wait.
    WorkerAsync,
    /// One task per listener on the shared pool; failures are isolated.
    ParallelAsync,
}

impl Policy {
    /// Every policy, in declaration order.
    pub const ALL: [Policy; 5] = [
        Policy::Direct,
        Policy::DeferredWait,
        Policy::DeferredAsync,
        Policy::WorkerAsync,
        Policy::ParallelAsync,
    ];

    /// Returns `true` if the caller blocks until the fan-out completes.
    pub const fn is_blocking(self) -> bool {
        matches!(self, Policy::Direct | Policy::DeferredWait)
    }

    /// Returns `true` if the fan-out runs on the designated thread.
    pub const fn is_deferred(self) -> bool {
        matches!(self, Policy::DeferredWait | Policy::DeferredAsync)
    }

    /// Position of this policy in [`Policy::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::Direct => "direct",
            Policy::DeferredWait => "deferred-wait",
            Policy::DeferredAsync => "deferred-async",
            Policy::WorkerAsync => "worker-async",
            Policy::ParallelAsync => "parallel-async",
        };
        f.write_str(name)
    }
}

/// A strategy for delivering one invocation to a snapshot of listeners.
///
/// Implementations carry no per-invocation state: every call to
/// [`dispatch`](DispatchPolicy::dispatch) is independent.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch invocations on `{T}`",
    label = "missing `DispatchPolicy` implementation"
)]
pub trait DispatchPolicy<T: ?Sized>: Send + Sync {
    /// The policy this strategy implements.
    fn kind(&self) -> Policy;

    /// Delivers `invocation` to `listeners`.
    ///
    /// Blocking policies return listener failures. Non-blocking policies
    /// return `Ok(())` once the work is submitted and only fail when it could
    /// not be submitted.
    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError>;
}
