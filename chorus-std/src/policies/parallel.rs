//! Per-listener parallel dispatch on a rayon pool.

use super::report;
use chorus_core::{
    AsyncDispatchFailure, DispatchError, DispatchPolicy, Invocation, ListenerFailure, Listeners,
    Policy,
};
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::{
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    thread,
};

/// Delivers each listener as an independent task on a shared thread pool.
///
/// `dispatch` submits the fan-out and returns without joining it. Every
/// listener call is isolated: a failure is logged and never prevents any
/// other listener, in this invocation or another, from running. Callers that
/// need completion must build it into their listeners.
///
/// The pool is built on first dispatch and lives as long as the policy.
pub struct ParallelAsync {
    threads: NonZeroUsize,
    pool: OnceCell<ThreadPool>,
}

impl ParallelAsync {
    /// Creates a policy sized to the available hardware parallelism.
    pub fn new() -> Self {
        Self::with_threads(default_parallelism())
    }

    /// Creates a policy whose pool has exactly `threads` threads.
    pub fn with_threads(threads: NonZeroUsize) -> Self {
        Self {
            threads,
            pool: OnceCell::new(),
        }
    }

    /// Number of pool threads.
    pub fn threads(&self) -> usize {
        self.threads.get()
    }

    /// Returns `true` once the pool has been built.
    pub fn is_started(&self) -> bool {
        self.pool.get().is_some()
    }

    fn pool(&self) -> Result<&ThreadPool, ThreadPoolBuildError> {
        self.pool.get_or_try_init(|| {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.threads.get())
                .thread_name(|i| format!("chorus-parallel-{i}"))
                // Without a handler rayon aborts the process on an escaped panic.
                .panic_handler(|payload| {
                    tracing::error!(
                        error = %ListenerFailure::from_panic(payload),
                        "parallel pool job panicked"
                    );
                })
                .build()?;
            tracing::debug!(threads = self.threads.get(), "parallel pool started");
            Ok(pool)
        })
    }
}

impl Default for ParallelAsync {
    fn default() -> Self {
        Self::new()
    }
}

/// The number of threads the parallel pool uses by default.
pub fn default_parallelism() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

impl<T: ?Sized + Send + Sync + 'static> DispatchPolicy<T> for ParallelAsync {
    fn kind(&self) -> Policy {
        Policy::ParallelAsync
    }

    fn dispatch(
        &self,
        listeners: Listeners<T>,
        invocation: Invocation<T>,
    ) -> Result<(), DispatchError> {
        let method = invocation.method();
        let pool = self
            .pool()
            .map_err(|err| DispatchError::PoolUnavailable {
                method,
                source: Box::new(err),
            })?;

        pool.spawn(move || {
            let invocation = &invocation;
            // Walking the snapshot runs filter predicates; a panic there is
            // reported like any other failure of this fan-out.
            let walked = panic::catch_unwind(AssertUnwindSafe(|| {
                rayon::scope(|scope| {
                    for listener in listeners {
                        scope.spawn(move |_| {
                            if let Err(source) = invocation.apply(&listener) {
                                report(&AsyncDispatchFailure {
                                    policy: Policy::ParallelAsync,
                                    method,
                                    source,
                                });
                            }
                        });
                    }
                });
            }));
            if let Err(payload) = walked {
                report(&AsyncDispatchFailure {
                    policy: Policy::ParallelAsync,
                    method,
                    source: ListenerFailure::from_panic(payload),
                });
            }
            tracing::trace!(method, "parallel fan-out finished");
        });
        Ok(())
    }
}
