//! Procedural macros for chorus.
//!
//! - `#[capability]` - turns a listener trait into a multicast capability

use proc_macro::TokenStream;

mod capability;

/// Turns a listener trait into a chorus capability.
///
/// The attribute keeps the trait and additionally:
/// - adds `Send + Sync` supertraits when they are missing,
/// - implements `chorus::Capability` for `dyn Trait`,
/// - implements the trait for `chorus::Handle<dyn Trait>`, so every call on a
///   handle is forwarded to the registered listeners.
///
/// Every method must take `&self`, take its arguments by value, have no
/// generic parameters and return `Result<(), E>` where
/// `E: Into<BoxError> + From<DispatchError>`.
///
/// ```rust,ignore
/// #[chorus::capability]
/// pub trait Progress {
///     fn advanced(&self, percent: u8) -> chorus::ListenerResult;
/// }
/// ```
///
/// `#[capability(name = "...")]` overrides the name reported by the
/// capability description.
#[proc_macro_attribute]
pub fn capability(attr: TokenStream, item: TokenStream) -> TokenStream {
    capability::capability_impl(attr, item)
}
