//! Standard listener holders.
//!
//! - [`StrongHolder`]: owns its listeners until they are unregistered
//! - [`WeakHolder`]: forgets listeners once nothing else owns them
//! - [`FilteredHolder`]: read-only subset of another holder

pub mod filtered;
pub mod strong;
pub mod weak;

pub use filtered::FilteredHolder;
pub use strong::StrongHolder;
pub use weak::WeakHolder;
