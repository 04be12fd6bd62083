//! Dispatch through the designated executor.

use super::{deliver_guarded, report};
use chorus_core::{
    AsyncDispatchFailure, DesignatedExecutor, DispatchError, DispatchPolicy, ExecutorError,
    Invocation, Listeners, Policy,
};
use futures::{channel::oneshot, executor::block_on};
use std::sync::Arc;

/// Delivers on the designated executor and waits for the result.
///
/// The caller blocks until its own task has run, not until the executor's
/// queue is empty. A listener failure stops the fan-out on the executor and
/// is returned to the caller. Waiting from the designated thread itself
/// would deadlock, so it fails with [`DispatchError::WaitOnDesignatedThread`].
#[derive(Clone)]
pub struct DeferredWait {
    executor: Arc<dyn DesignatedExecutor>,
}

impl DeferredWait {
    /// Creates the policy on top of `executor`.
    pub fn new(executor: Arc<dyn DesignatedExecutor>) -> Self {
        Self { executor }
    }
}

impl<T: ?Sized + Send + Sync + 'static> DispatchPolicy<T> for DeferredWait {
    fn kind(&self) -> Policy {
        Policy::DeferredWait
    }

    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError> {
        let method = invocation.method();
        if self.executor.is_designated_thread() {
            return Err(DispatchError::WaitOnDesignatedThread { method });
        }

        let (tx, rx) = oneshot::channel();
        self.executor
            .execute(Box::new(move || {
                // The receiver only goes away if the caller stopped waiting.
                let _ = tx.send(deliver_guarded(listeners, &invocation));
            }))
            .map_err(|source| DispatchError::ExecutorUnavailable { method, source })?;

        match block_on(rx) {
            Ok(outcome) => outcome.map_err(|source| DispatchError::listener(method, source)),
            // The executor dropped the task without running it.
            Err(oneshot::Canceled) => Err(DispatchError::ExecutorUnavailable {
                method,
                source: ExecutorError::Shutdown,
            }),
        }
    }
}

/// Delivers on the designated executor without waiting.
///
/// Returns as soon as the task is queued. A listener failure stops the
/// fan-out and is logged on the executor's thread.
#[derive(Clone)]
pub struct DeferredAsync {
    executor: Arc<dyn DesignatedExecutor>,
}

impl DeferredAsync {
    /// Creates the policy on top of `executor`.
    pub fn new(executor: Arc<dyn DesignatedExecutor>) -> Self {
        Self { executor }
    }
}

impl<T: ?Sized + Send + Sync + 'static> DispatchPolicy<T> for DeferredAsync {
    fn kind(&self) -> Policy {
        Policy::DeferredAsync
    }

    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError> {
        let method = invocation.method();
        self.executor
            .execute(Box::new(move || {
                if let Err(source) = deliver_guarded(listeners, &invocation) {
                    report(&AsyncDispatchFailure {
                        policy: Policy::DeferredAsync,
                        method,
                        source,
                    });
                }
            }))
            .map_err(|source| DispatchError::ExecutorUnavailable { method, source })
    }
}
