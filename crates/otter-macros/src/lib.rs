//! # Otter Macros - Proc-macros for the Otter Runtime
//!
//! This crate provides the derive that exposes plain Rust structs to script
//! property access in the Otter host layer (`otter-host`).
//!
//! ## The `ScriptRecord` Derive
//!
//! `#[derive(ScriptRecord)]` builds the record's descriptor table: one entry
//! per field marked with `#[script]`, plus an optional link to an embedded
//! ancestor record. Unmarked fields are never visible to scripts, whatever
//! their Rust visibility.
//!
//! ### Field markers
//!
//! - `#[script]` - expose the field under its own name
//! - `#[script(name = "displayName")]` - expose it under another name
//! - `#[script(readonly)]` - readable from scripts, writes are ignored
//! - `#[script(base)]` - this field holds the ancestor record; lookups that
//!   miss on this type continue there
//!
//! ### Container options
//!
//! - `#[script(name = "Type")]` - type name used in diagnostics
//! - `#[script(object)]` - the type also implements `ScriptObject` and is
//!   dispatched through it
//! - `#[script(crate_path = "...")]` - path to otter_host (default:
//!   `::otter_host`). Use `crate_path = "crate"` inside otter-host itself.
//!
//! ### Example
//!
//! ```ignore
//! use otter_host::ScriptRecord;
//!
//! #[derive(ScriptRecord)]
//! struct Animal {
//!     #[script]
//!     legs: i32,
//! }
//!
//! #[derive(ScriptRecord)]
//! struct Dog {
//!     #[script(base)]
//!     animal: Animal,
//!     #[script(name = "displayName")]
//!     name: String,
//!     #[script(readonly)]
//!     id: i64,
//!     owner_notes: String,
//! }
//! ```
//!
//! ## Generated Code
//!
//! The derive implements `otter_host::record::ScriptRecord`. The record type
//! is built inside a lazily initialised static, so the descriptor table exists
//! once per type no matter how many instances are accessed.

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod script_record;

/// Derives `otter_host::record::ScriptRecord` for a struct with named fields.
///
/// See the crate documentation for the `#[script(...)]` markers.
#[proc_macro_derive(ScriptRecord, attributes(script))]
pub fn derive_script_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);

    match script_record::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
