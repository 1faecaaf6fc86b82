//! Derive macros for the regvm crate.
//!
//! Provides `#[derive(Error)]`, which generates `Display` and
//! `std::error::Error` for the VM's error enum from `#[error("...")]`
//! attributes.

mod error;

use proc_macro::TokenStream;

/// Implements `Display` and `Error` for an enum or struct.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
