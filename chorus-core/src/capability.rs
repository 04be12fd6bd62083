//! # Capability descriptions
//!
//! A capability is the method set shared by listeners and dispatch handles.
//! In chorus a capability is always a trait object type (`dyn MyListener`):
//! listeners are `Arc<dyn MyListener>`, and the dispatch handle implements
//! `MyListener` by forwarding every call to the registered listeners.
//!
//! The `#[chorus::capability]` attribute implements [`Capability`] for the
//! trait object type and describes its methods. Hand-written implementations
//! are allowed; [`validate`] rejects the ones that cannot work.

use crate::error::ConstructionError;
use std::mem;

/// A trait object type whose methods can be multicast to listeners.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a chorus capability",
    label = "missing `Capability` implementation",
    note = "Annotate the listener trait with `#[chorus::capability]` and use `dyn Trait` as the capability."
)]
pub trait Capability: Send + Sync + 'static {
    /// Describes the methods of this capability.
    fn description() -> CapabilityDescription;
}

/// Static description of a capability's method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityDescription {
    /// The trait name.
    pub name: &'static str,
    /// The methods, in declaration order.
    pub methods: &'static [MethodDescription],
}

impl CapabilityDescription {
    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescription> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Static description of one capability method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescription {
    /// The method name.
    pub name: &'static str,
    /// The argument types, as written in the trait.
    pub arguments: &'static [&'static str],
}

impl MethodDescription {
    /// Number of arguments, excluding the receiver.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

/// Checks that `T` can back a listener support.
///
/// `T` must be unsized (a trait object): a sized type carries data of its own
/// and cannot stand for a pure method set. The description must name every
/// method exactly once.
pub fn validate<T: Capability + ?Sized>() -> Result<CapabilityDescription, ConstructionError> {
    // Pointers to sized types are thin; trait objects carry a vtable.
    if mem::size_of::<*const T>() == mem::size_of::<*const ()>() {
        return Err(ConstructionError::NotATraitObject {
            type_name: std::any::type_name::<T>(),
        });
    }

    let description = T::description();
    for (index, method) in description.methods.iter().enumerate() {
        if method.name.is_empty() {
            return Err(ConstructionError::EmptyMethodName {
                capability: description.name,
            });
        }
        if description.methods[..index]
            .iter()
            .any(|earlier| earlier.name == method.name)
        {
            return Err(ConstructionError::DuplicateMethod {
                capability: description.name,
                method: method.name,
            });
        }
    }
    Ok(description)
}
