//! Standard dispatch policies.
//!
//! | Policy | Runs on | Caller waits | Failure |
//! |---|---|---|---|
//! | [`Direct`] | caller | yes | returned, rest skipped |
//! | [`DeferredWait`] | designated thread | yes | returned, rest skipped |
//! | [`DeferredAsync`] | designated thread | no | logged, rest skipped |
//! | [`WorkerAsync`] | new thread | no | logged, rest skipped |
//! | [`ParallelAsync`] | shared pool | no | logged, isolated per listener |

pub mod deferred;
pub mod direct;
pub mod parallel;
pub mod worker;

pub use deferred::{DeferredAsync, DeferredWait};
pub use direct::Direct;
pub use parallel::ParallelAsync;
pub use worker::WorkerAsync;

use chorus_core::{AsyncDispatchFailure, Invocation, ListenerFailure, Listeners};
use std::panic::{self, AssertUnwindSafe};

/// Logs a fire-and-forget failure.
///
/// Every standard asynchronous policy reports through this function; custom
/// policies can use it to log in the same shape.
pub fn report(failure: &AsyncDispatchFailure) {
    tracing::error!(
        policy = %failure.policy,
        method = failure.method,
        panicked = failure.source.is_panic(),
        error = %failure.source,
        "asynchronous dispatch failed"
    );
}

/// Calls `invocation` on each listener in order, stopping at the first failure.
pub(crate) fn deliver_sequential<T: ?Sized>(
    listeners: Listeners<T>,
    invocation: &Invocation<T>,
) -> Result<(), ListenerFailure> {
    for listener in listeners {
        tracing::trace!(method = invocation.method(), "delivering to listener");
        invocation.apply(&listener)?;
    }
    Ok(())
}

/// Like [`deliver_sequential`], but a panic raised while walking the
/// snapshot (a filter predicate, a custom holder) is also turned into a
/// failure. The sequential policies all deliver through this.
pub(crate) fn deliver_guarded<T: ?Sized>(
    listeners: Listeners<T>,
    invocation: &Invocation<T>,
) -> Result<(), ListenerFailure> {
    panic::catch_unwind(AssertUnwindSafe(|| deliver_sequential(listeners, invocation)))
        .unwrap_or_else(|payload| Err(ListenerFailure::from_panic(payload)))
}
