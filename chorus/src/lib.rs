//! # chorus - Multicast Listener Dispatch
//!
//! `chorus` turns a listener trait into a single callable handle. Calling a
//! method on the handle forwards the call to every registered listener under
//! an execution policy chosen by the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chorus::prelude::*;
//! use std::sync::Arc;
//!
//! #[chorus::capability]
//! pub trait DownloadListener {
//!     fn progress(&self, url: String, percent: u8) -> ListenerResult;
//! }
//!
//! let support = ListenerSupport::<dyn DownloadListener>::new()?;
//! support.register(Arc::new(StatusBar::default()))?;
//!
//! // Every listener, on this thread, fail-fast.
//! support.fire().progress("https://example.org".into(), 50)?;
//!
//! // Every listener, each as its own task on the parallel pool.
//! support.fire_in_parallel().progress("https://example.org".into(), 100)?;
//! ```
//!
//! ## Policies
//!
//! | Policy | Runs on | Caller waits | On failure |
//! |---|---|---|---|
//! | [`Policy::Direct`] | caller | yes | stop, return error |
//! | [`Policy::DeferredWait`] | designated thread | yes | stop, return error |
//! | [`Policy::DeferredAsync`] | designated thread | no | stop, log |
//! | [`Policy::WorkerAsync`] | new thread | no | stop, log |
//! | [`Policy::ParallelAsync`] | thread pool | no | log, others continue |
//!
//! ## Crates
//!
//! - `chorus-core`: traits and error types
//! - `chorus-std`: holders, policies and executors
//! - `chorus-macros`: the `#[capability]` attribute (feature `macros`, on by
//!   default)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod handle;
mod support;

pub use chorus_core::{
    // Errors
    AsyncDispatchFailure,
    BoxError,
    // Capability
    Capability,
    CapabilityDescription,
    ChorusError,
    // Holder
    CollectionHolder,
    ConstructionError,
    // Executor
    DesignatedExecutor,
    DispatchError,
    // Policy
    DispatchPolicy,
    ExecutorError,
    // Invocation
    Invocation,
    ListenerFailure,
    ListenerFilter,
    ListenerResult,
    Listeners,
    MethodDescription,
    Mutation,
    Policy,
    ReadOnlyViolation,
    Task,
    same_listener,
};

pub use handle::Handle;
pub use support::{ListenerSupport, SupportBuilder};

/// Listener holders.
pub mod holders {
    pub use chorus_std::holders::{FilteredHolder, StrongHolder, WeakHolder};
}

/// Dispatch policies.
pub mod policies {
    pub use chorus_std::policies::{
        DeferredAsync, DeferredWait, Direct, ParallelAsync, WorkerAsync, report,
    };
}

/// Designated executors.
pub mod executors {
    pub use chorus_std::executors::{DesignatedThread, InlineExecutor};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use chorus_std::testing::*;
}

/// Prelude module - common imports for chorus.
///
/// # Usage
///
/// ```rust,ignore
/// use chorus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Capability, DispatchError, Handle, ListenerResult, ListenerSupport, Policy,
        ReadOnlyViolation, same_listener,
    };

    #[cfg(feature = "macros")]
    pub use crate::capability;
}

#[cfg(feature = "macros")]
pub use chorus_macros::capability;
