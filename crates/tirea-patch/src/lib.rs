//! Permission-aware partial updates of typed structs from dynamic JSON maps.
//!
//! `tirea-patch` takes a loosely typed patch (a `serde_json` object), applies it
//! to a typed record in place, and reports exactly what changed.
//!
//! # Core Concepts
//!
//! - **Patchable**: Runtime field access for a struct, generated by `#[derive(Patchable)]`
//! - **Patcher**: Applies patches according to a [`PatcherConfig`]
//! - **NameSource**: Which name of a field (declared, `json`, `bson`, ...) is used for
//!   the patch keys and for each output
//! - **PermittedFields**: Dotted allow-list such as `["username", "profile.*"]`
//! - **Coercer**: Optional conversion of values whose shape does not match the field
//! - **PatchResult**: Updated field names, rejected fields, and a map of applied values
//!
//! # Nested records
//!
//! Fields marked `nested` (or `merge`) are patched field by field and reported
//! with flattened keys such as `profile.motto`. Fields marked `replace` are reset
//! to their default first and reported as one grouped value. Fields marked `skip`
//! are never patched, and a patch naming one is treated as unpermitted.
//!
//! # Quick Start
//!
//! ```ignore
//! use tirea_patch::{NameSource, Patchable, Patcher, PatcherConfig};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, Patchable)]
//! pub struct User {
//!     #[patch(json = "username")]
//!     pub username: String,
//!     #[patch(json = "is_banned")]
//!     pub is_banned: bool,
//!     #[patch(json = "profile", nested)]
//!     pub profile: Profile,
//! }
//!
//! #[derive(Debug, Default, Patchable)]
//! pub struct Profile {
//!     #[patch(json = "motto")]
//!     pub motto: String,
//! }
//!
//! let patcher = Patcher::new(
//!     PatcherConfig::new()
//!         .with_source(NameSource::Json)
//!         .with_permitted_fields(["username", "profile.*"]),
//! );
//!
//! let mut user = User::default();
//! let result = patcher
//!     .patch_value(
//!         &mut user,
//!         &json!({"username": "alice", "is_banned": true, "profile": {"motto": "hi"}}),
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.fields, vec!["username", "profile.motto"]);
//! assert_eq!(result.unpermitted, vec!["is_banned"]);
//! assert!(!user.is_banned);
//! ```

mod coerce;
mod config;
mod error;
mod field;
mod naming;
mod path;
mod patcher;
mod permission;
mod result;
mod skip;
mod walker;

// Core types
pub use error::{value_type_name, FieldError, PatchError};
pub use field::{FieldDescriptor, FieldShape, PatchMode, Patchable};
pub use path::FieldPath;
pub use result::PatchResult;

// Configuration
pub use config::PatcherConfig;
pub use naming::{resolve, NameSource, UnknownNameSource};
pub use permission::{Access, PermittedFields, WILDCARD};

// Extension points
pub use coerce::{coercer_fn, Coercer, CoercerRegistry, FnCoercer, NumericStrings, NumericWidening};
pub use skip::SkipCondition;

// Patching
pub use patcher::{default_patcher, Patcher};

pub use serde_json::Value;

// Re-export derive macro when feature is enabled
#[cfg(feature = "derive")]
pub use tirea_patch_derive::Patchable;
