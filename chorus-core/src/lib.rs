//! # chorus-core
//!
//! Core traits for the chorus multicast listener framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! crates that provide their own holders, policies or executors without
//! pulling in the standard implementations of `chorus-std`.
//!
//! # Building Blocks
//!
//! ## Capability ([`Capability`])
//!
//! The method set shared by listeners and dispatch handles, always a trait
//! object type such as `dyn MyListener`.
//!
//! ## Invocation ([`Invocation`])
//!
//! One call made on a dispatch handle, replayable on any listener.
//!
//! ## Holder ([`CollectionHolder`])
//!
//! The registered listener set. Produces snapshot iterators that stay valid
//! while the set changes.
//!
//! ## Policy ([`DispatchPolicy`])
//!
//! How and where one invocation reaches every listener of a snapshot.
//!
//! # Error Types
//!
//! - [`ChorusError`] - Top-level error type
//! - [`DispatchError`] - Synchronous dispatch errors
//! - [`AsyncDispatchFailure`] - Fire-and-forget failures (logged, never returned)
//! - [`ReadOnlyViolation`] - Mutation of a filtered view

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod capability;
mod error;
mod executor;
mod holder;
mod invocation;
mod policy;

// Re-exports
pub use capability::{Capability, CapabilityDescription, MethodDescription, validate};
pub use error::{
    AsyncDispatchFailure, BoxError, ChorusError, ConstructionError, DispatchError, ExecutorError,
    ListenerFailure, Mutation, ReadOnlyViolation,
};
pub use executor::{DesignatedExecutor, Task};
pub use holder::{CollectionHolder, ListenerFilter, Listeners, same_listener};
pub use invocation::{Invocation, ListenerResult};
pub use policy::{DispatchPolicy, Policy};
