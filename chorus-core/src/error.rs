//! Error types for chorus.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ChorusError`] - Top-level error type for all chorus operations
//! - [`ConstructionError`] - The capability type cannot back a listener support
//! - [`DispatchError`] - A synchronous fan-out failed or could not be started
//! - [`AsyncDispatchFailure`] - A fire-and-forget fan-out failed (logged only)
//! - [`ReadOnlyViolation`] - A filtered view was asked to mutate
//! - [`ListenerFailure`] - What a single listener call produced

use crate::policy::Policy;
use std::{any::Any, fmt};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all chorus operations.
#[derive(Error, Debug)]
pub enum ChorusError {
    /// The listener support could not be created.
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// A synchronous dispatch failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A filtered view was asked to register or unregister.
    #[error(transparent)]
    ReadOnly(#[from] ReadOnlyViolation),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while building a listener support for a capability type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// The capability type is a concrete, sized type rather than a trait object.
    #[error("`{type_name}` is a sized type; capabilities must be trait objects (`dyn Trait`)")]
    NotATraitObject {
        /// Name of the offending type.
        type_name: &'static str,
    },

    /// The capability description has a method without a name.
    #[error("capability `{capability}` describes a method with an empty name")]
    EmptyMethodName {
        /// Name of the capability.
        capability: &'static str,
    },

    /// The capability description lists the same method twice.
    #[error("capability `{capability}` describes method `{method}` more than once")]
    DuplicateMethod {
        /// Name of the capability.
        capability: &'static str,
        /// The repeated method name.
        method: &'static str,
    },
}

/// The outcome of one failed listener call.
#[derive(Error, Debug)]
pub enum ListenerFailure {
    /// The listener returned an error.
    #[error(transparent)]
    Error(BoxError),

    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerFailure {
    /// Returns `true` if the listener panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerFailure::Panicked(_))
    }

    /// Builds a [`ListenerFailure::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ListenerFailure::Panicked(message)
    }
}

/// Errors returned to the caller of a dispatch handle.
///
/// Only the blocking policies ([`Policy::Direct`], [`Policy::DeferredWait`])
/// report listener failures this way. The asynchronous policies only return
/// errors that prevented the fan-out from being submitted at all.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener failed; the remaining listeners of the invocation were skipped.
    #[error("listener failed during `{method}`")]
    Listener {
        /// The capability method being dispatched.
        method: &'static str,
        /// The failure of the listener.
        #[source]
        source: ListenerFailure,
    },

    /// The designated executor no longer accepts tasks.
    #[error("designated executor is unavailable; `{method}` was not delivered")]
    ExecutorUnavailable {
        /// The capability method being dispatched.
        method: &'static str,
        /// Why the executor refused the task.
        #[source]
        source: ExecutorError,
    },

    /// A blocking hand-off was requested from the designated thread itself.
    #[error("`{method}` cannot wait on the designated thread from the designated thread")]
    WaitOnDesignatedThread {
        /// The capability method being dispatched.
        method: &'static str,
    },

    /// A worker thread could not be spawned.
    #[error("failed to spawn a worker thread for `{method}`")]
    WorkerSpawn {
        /// The capability method being dispatched.
        method: &'static str,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The parallel worker pool could not be built.
    #[error("parallel pool is unavailable; `{method}` was not delivered")]
    PoolUnavailable {
        /// The capability method being dispatched.
        method: &'static str,
        /// Why the pool could not be built.
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// Creates a listener failure for `method`.
    pub fn listener(method: &'static str, source: ListenerFailure) -> Self {
        DispatchError::Listener { method, source }
    }

    /// The capability method this error belongs to.
    pub fn method(&self) -> &'static str {
        match self {
            DispatchError::Listener { method, .. }
            | DispatchError::ExecutorUnavailable { method, .. }
            | DispatchError::WaitOnDesignatedThread { method }
            | DispatchError::WorkerSpawn { method, .. }
            | DispatchError::PoolUnavailable { method, .. } => method,
        }
    }

    /// Returns the listener failure, if this error was caused by one.
    pub fn listener_failure(&self) -> Option<&ListenerFailure> {
        match self {
            DispatchError::Listener { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A listener failure under a fire-and-forget policy.
///
/// These are never returned to the caller; the executing context reports
/// them through `tracing` and drops them.
#[derive(Error, Debug)]
#[error("{policy} dispatch of `{method}` failed")]
pub struct AsyncDispatchFailure {
    /// The policy the invocation was dispatched with.
    pub policy: Policy,
    /// The capability method being dispatched.
    pub method: &'static str,
    /// The failure of the listener.
    #[source]
    pub source: ListenerFailure,
}

/// Errors raised by a [`DesignatedExecutor`](crate::DesignatedExecutor).
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The executor's thread could not be started.
    #[error("failed to start the designated thread")]
    Spawn(#[source] std::io::Error),

    /// The executor has shut down and no longer accepts tasks.
    #[error("designated executor has shut down")]
    Shutdown,
}

/// The mutation a read-only view refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// `register`
    Register,
    /// `unregister`
    Unregister,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Register => f.write_str("register"),
            Mutation::Unregister => f.write_str("unregister"),
        }
    }
}

/// A filtered view was asked to register or unregister a listener.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {operation} a listener on a filtered view")]
pub struct ReadOnlyViolation {
    /// The refused operation.
    pub operation: Mutation,
}

impl ReadOnlyViolation {
    /// Creates a violation for `operation`.
    pub const fn new(operation: Mutation) -> Self {
        Self { operation }
    }
}

// Convenience conversions
impl From<BoxError> for ChorusError {
    fn from(err: BoxError) -> Self {
        ChorusError::Custom(err)
    }
}

impl From<BoxError> for ListenerFailure {
    fn from(err: BoxError) -> Self {
        ListenerFailure::Error(err)
    }
}
