//! Derive macro for tirea-patch `Patchable` trait.
//!
//! This crate provides the `#[derive(Patchable)]` macro that generates:
//! - A static `FieldDescriptor` table describing every field
//! - `impl Patchable for {Name}` with index-based field accessors
//!
//! # Usage
//!
//! ```ignore
//! use tirea_patch::Patchable;
//!
//! #[derive(Default, Patchable)]
//! pub struct User {
//!     #[patch(json = "username")]
//!     pub username: String,
//!     #[patch(json = "profile", nested)]
//!     pub profile: Profile,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod field_kind;
mod parse;

/// Derive the `Patchable` trait for a struct with named fields.
///
/// Only fields with a visibility modifier (`pub`, `pub(crate)`, ...) can be
/// patched. Private fields are listed in the field table but never written.
///
/// # Attributes
///
/// ## Field Attributes
///
/// - `#[patch(json = "name")]`, `bson`, `mapstructure`, `msgpack`: Key of the
///   field under that naming source. An empty string counts as no key.
/// - `#[patch(skip)]`: Never patch this field. A patch naming it is reported as
///   unpermitted.
/// - `#[patch(nested)]`: Patch a struct field through its own fields and report
///   flattened keys (`profile.motto`). The field type must implement
///   `Patchable` and `Default`; `Box<T>`, `Option<T>` and `Option<Box<T>>` are
///   accepted. Without this, a struct field is deserialized as a whole value.
/// - `#[patch(merge)]`: Same as `nested`.
/// - `#[patch(replace)]`: Like `nested`, but the field is reset to its default
///   before patching and reported as one grouped value.
///
/// `skip`, `merge` and `replace` are mutually exclusive.
///
/// Every field that can be patched directly must implement
/// `serde::Deserialize`.
///
/// # Examples
///
/// ```ignore
/// use tirea_patch::Patchable;
///
/// #[derive(Default, Patchable)]
/// pub struct User {
///     #[patch(skip)]
///     pub id: u64,
///     #[patch(json = "email_address", bson = "email")]
///     pub email: String,
///     #[patch(json = "ban_data", replace)]
///     pub ban: Option<Box<BanData>>,
///     password_hash: String,
/// }
/// ```
#[proc_macro_derive(Patchable, attributes(patch))]
pub fn derive_patchable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
