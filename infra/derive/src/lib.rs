#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the BNS workspace.
//!
//! The only macro today is [`macro@bns_error`], which turns a plain enum into a
//! `thiserror` error type with context support. Infrastructure crates (`bns-storage`,
//! `bns-event-bus`, `bns-logger`) and feature crates declare their errors with it so every
//! error in the workspace renders the same way: `"<what failed> (<context>): <detail>"`.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! bns-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining domain-specific error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>`, and for
///   `Result<T, SourceError>` of every variant that wraps a source error.
/// * `From<SourceError>` for every variant with a `source` field (or a field marked
///   `#[source]` / `#[from]`), except a variant named `Internal`.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for the `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields.
/// 3. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 4. A variant with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[bns_derive::bns_error]
/// pub enum StoreError {
///     #[error("Read failed{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Loading notification log")
/// }
/// ```
#[proc_macro_attribute]
pub fn bns_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
