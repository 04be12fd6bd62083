//! # chorus-std
//!
//! Standard implementations for the chorus multicast listener framework.
//!
//! This crate provides:
//! - **Holders**: [`StrongHolder`], [`WeakHolder`], [`FilteredHolder`]
//! - **Policies**: [`Direct`], [`DeferredWait`], [`DeferredAsync`],
//!   [`WorkerAsync`], [`ParallelAsync`]
//! - **Executors**: [`DesignatedThread`], [`InlineExecutor`]
//! - **Testing**: [`CountdownLatch`](testing::CountdownLatch), [`CallLog`](testing::CallLog)
//!
//! [`StrongHolder`]: holders::StrongHolder
//! [`WeakHolder`]: holders::WeakHolder
//! [`FilteredHolder`]: holders::FilteredHolder
//! [`Direct`]: policies::Direct
//! [`DeferredWait`]: policies::DeferredWait
//! [`DeferredAsync`]: policies::DeferredAsync
//! [`WorkerAsync`]: policies::WorkerAsync
//! [`ParallelAsync`]: policies::ParallelAsync
//! [`DesignatedThread`]: executors::DesignatedThread
//! [`InlineExecutor`]: executors::InlineExecutor

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use chorus_core;

// Modules
pub mod executors;
pub mod holders;
pub mod policies;
pub mod testing;
