//! `#[derive(Error)]` expansion.
//!
//! ```ignore
//! use regvm_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum SolveError {
//!     #[error("opcode {opcode} has {candidates} candidates")]
//!     Ambiguous { opcode: u8, candidates: usize },
//!
//!     #[error("unknown mnemonic: {0}")]
//!     Mnemonic(String),
//!
//!     #[error("empty program")]
//!     Empty,
//! }
//! ```
//!
//! Every field of a variant must be referenced by its message, since the
//! generated `write!` passes all of them as named arguments.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Meta, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| {
                    let ident = &variant.ident;
                    let message = message_from(&variant.attrs, ident, "variant")?;
                    Ok(variant_arm(ident, &message, &variant.fields))
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data) => {
            let message = message_from(&input.attrs, name, "type")?;
            struct_body(&message, &data.fields)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

fn variant_arm(ident: &syn::Ident, message: &str, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! {
            Self::#ident => write!(f, #message),
        },
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let message = positional_to_named(message, bindings.len());
            quote! {
                Self::#ident(#(#bindings),*) => write!(f, #message, #(#bindings = #bindings),*),
            }
        }
        Fields::Named(named) => {
            let names: Vec<_> = named.named.iter().map(|field| &field.ident).collect();
            quote! {
                Self::#ident { #(#names),* } => write!(f, #message, #(#names = #names),*),
            }
        }
    }
}

fn struct_body(message: &str, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! { write!(f, #message) },
        Fields::Named(named) => {
            let names: Vec<_> = named.named.iter().map(|field| &field.ident).collect();
            quote! { write!(f, #message, #(#names = self.#names),*) }
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("f{}", i))
                .collect();
            let indices: Vec<_> = (0..unnamed.unnamed.len()).map(syn::Index::from).collect();
            let message = positional_to_named(message, bindings.len());
            quote! { write!(f, #message, #(#bindings = self.#indices),*) }
        }
    }
}

/// Reads the string literal out of the first `#[error("...")]` attribute.
fn message_from<T: ToTokens>(attrs: &[Attribute], target: &T, kind: &str) -> syn::Result<String> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("error")) else {
        return Err(syn::Error::new_spanned(
            target,
            format!(
                "missing #[error(\"...\")] attribute on {} `{}`",
                kind,
                target.to_token_stream()
            ),
        ));
    };

    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "expected #[error(\"message\")]",
        ));
    };

    syn::parse2::<LitStr>(list.tokens.clone())
        .map(|lit| lit.value())
        .map_err(|_| {
            syn::Error::new_spanned(
                &attr.meta,
                "#[error] message must be a string literal, e.g. #[error(\"unbound opcode {0}\")]",
            )
        })
}

/// Rewrites `{0}`, `{1}` into `{f0}`, `{f1}` so tuple fields can be passed by name.
fn positional_to_named(message: &str, field_count: usize) -> String {
    (0..field_count).rev().fold(message.to_string(), |acc, i| {
        acc.replace(&format!("{{{}}}", i), &format!("{{f{}}}", i))
            .replace(&format!("{{{}:", i), &format!("{{f{}:", i))
    })
}
