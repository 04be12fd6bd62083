//! Capability-related macros.
//!
//! This module contains:
//! - `#[capability]` - Attribute macro turning a listener trait into a
//!   multicast capability with a forwarding `Handle` implementation

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ItemTrait, LitStr, ReturnType, Signature, Token, TraitItem, TraitItemFn, Type,
    TypeParamBound,
    parse::{Parse, ParseStream},
    parse_macro_input, parse_quote,
};

/// Arguments for the `#[capability]` macro.
pub(crate) struct CapabilityArgs {
    pub name: Option<String>,
}

impl Parse for CapabilityArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(CapabilityArgs { name })
    }
}

/// Implementation of the `#[capability]` macro.
pub fn capability_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as CapabilityArgs);
    let mut input = parse_macro_input!(item as ItemTrait);

    match expand(&args, &mut input) {
        Ok(expanded) => TokenStream::from(expanded),
        // Keep the trait itself so the error is the only one reported.
        Err(err) => {
            let err = err.to_compile_error();
            TokenStream::from(quote! {
                #input
                #err
            })
        }
    }
}

fn expand(args: &CapabilityArgs, input: &mut ItemTrait) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "capability traits cannot be generic",
        ));
    }

    let methods = input
        .items
        .iter()
        .map(|item| match item {
            TraitItem::Fn(method) => Method::parse(method),
            other => Err(syn::Error::new_spanned(
                other,
                "capability traits may only contain methods",
            )),
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let trait_name = &input.ident;
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| trait_name.to_string());
    let descriptions: Vec<_> = methods.iter().map(Method::description).collect();
    let forwards: Vec<_> = methods
        .iter()
        .map(|method| method.forward(trait_name))
        .collect();

    let capability_impl = quote! {
        impl ::chorus::Capability for dyn #trait_name {
            fn description() -> ::chorus::CapabilityDescription {
                ::chorus::CapabilityDescription {
                    name: #name,
                    methods: &[#(#descriptions),*],
                }
            }
        }

        impl #trait_name for ::chorus::Handle<dyn #trait_name> {
            #(#forwards)*
        }
    };

    add_marker_supertraits(input);

    Ok(quote! {
        #input
        #capability_impl
    })
}

/// A validated capability method.
struct Method<'a> {
    sig: &'a Signature,
    args: Vec<(Ident, &'a Type)>,
}

impl<'a> Method<'a> {
    fn parse(method: &'a TraitItemFn) -> syn::Result<Self> {
        let sig = &method.sig;

        if let Some(token) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                token,
                "capability methods cannot be async",
            ));
        }
        if let Some(token) = &sig.unsafety {
            return Err(syn::Error::new_spanned(
                token,
                "capability methods cannot be unsafe",
            ));
        }
        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "capability methods cannot have generic parameters",
            ));
        }

        match sig.inputs.first() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some()
                    && receiver.mutability.is_none()
                    && receiver.colon_token.is_none() => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    sig,
                    "capability methods must take `&self`",
                ));
            }
        }

        let mut args = Vec::new();
        for (index, input) in sig.inputs.iter().skip(1).enumerate() {
            let FnArg::Typed(pat_type) = input else {
                return Err(syn::Error::new_spanned(input, "unexpected receiver"));
            };
            match &*pat_type.ty {
                Type::Reference(_) => {
                    return Err(syn::Error::new_spanned(
                        &pat_type.ty,
                        "capability method arguments must be owned (`Clone + Send + Sync + 'static`), not references",
                    ));
                }
                Type::ImplTrait(_) => {
                    return Err(syn::Error::new_spanned(
                        &pat_type.ty,
                        "capability method arguments cannot use `impl Trait`",
                    ));
                }
                _ => {}
            }
            args.push((format_ident!("__chorus_arg{}", index), &*pat_type.ty));
        }

        let returns_unit = match &sig.output {
            ReturnType::Default => true,
            ReturnType::Type(_, ty) => matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
        };
        if returns_unit {
            return Err(syn::Error::new_spanned(
                sig,
                "capability methods must return `Result<(), E>` (for example `chorus::ListenerResult`)",
            ));
        }

        Ok(Method { sig, args })
    }

    /// The `MethodDescription` literal for this method.
    fn description(&self) -> TokenStream2 {
        let name = self.sig.ident.to_string();
        let types = self
            .args
            .iter()
            .map(|(_, ty)| quote! { ::core::stringify!(#ty) });

        quote! {
            ::chorus::MethodDescription {
                name: #name,
                arguments: &[#(#types),*],
            }
        }
    }

    /// The forwarding implementation on `Handle<dyn Trait>`.
    fn forward(&self, trait_name: &Ident) -> TokenStream2 {
        let ident = &self.sig.ident;
        let output = &self.sig.output;
        let name = ident.to_string();
        let params = self.args.iter().map(|(arg, ty)| quote! { #arg: #ty });
        let clones = self
            .args
            .iter()
            .map(|(arg, _)| quote! { ::core::clone::Clone::clone(&#arg) });

        quote! {
            fn #ident(&self, #(#params),*) #output {
                let invocation = ::chorus::Invocation::<dyn #trait_name>::new(
                    #name,
                    move |__chorus_listener| {
                        __chorus_listener
                            .#ident(#(#clones),*)
                            .map_err(::core::convert::Into::into)
                    },
                );
                ::chorus::Handle::dispatch(self, invocation).map_err(::core::convert::From::from)
            }
        }
    }
}

/// Adds `Send` and `Sync` to the supertraits unless already present.
fn add_marker_supertraits(input: &mut ItemTrait) {
    let has = |marker: &str| {
        input.supertraits.iter().any(|bound| {
            matches!(bound, TypeParamBound::Trait(bound)
                if bound.path.segments.last().is_some_and(|segment| segment.ident == marker))
        })
    };
    let missing_send = !has("Send");
    let missing_sync = !has("Sync");

    if missing_send {
        input
            .supertraits
            .push(parse_quote!(::core::marker::Send));
    }
    if missing_sync {
        input
            .supertraits
            .push(parse_quote!(::core::marker::Sync));
    }
    if !input.supertraits.is_empty() && input.colon_token.is_none() {
        input.colon_token = Some(<Token![:]>::default());
    }
}
