//! Field name sources and key resolution.
//!
//! A struct field can be known by several names: its declared Rust name and
//! one alias per serialization format. The patcher resolves a field's key
//! separately for reading the patch map and for each of the two outputs
//! (`PatchResult::fields` and `PatchResult::map`).

use crate::{FieldDescriptor, PatchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a field's external name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    /// The declared Rust field name.
    #[default]
    #[serde(alias = "")]
    Struct,
    /// `#[patch(json = "...")]`
    Json,
    /// `#[patch(bson = "...")]`
    Bson,
    /// `#[patch(mapstructure = "...")]`
    Mapstructure,
    /// `#[patch(msgpack = "...")]`
    Msgpack,
}

impl NameSource {
    /// All supported sources.
    pub const ALL: [NameSource; 5] = [
        NameSource::Struct,
        NameSource::Json,
        NameSource::Bson,
        NameSource::Mapstructure,
        NameSource::Msgpack,
    ];

    /// Lowercase identifier of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            NameSource::Struct => "struct",
            NameSource::Json => "json",
            NameSource::Bson => "bson",
            NameSource::Mapstructure => "mapstructure",
            NameSource::Msgpack => "msgpack",
        }
    }
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown name source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name source `{0}`")]
pub struct UnknownNameSource(pub String);

impl FromStr for NameSource {
    type Err = UnknownNameSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "struct" => Ok(NameSource::Struct),
            other => NameSource::ALL
                .into_iter()
                .find(|source| source.as_str() == other)
                .ok_or_else(|| UnknownNameSource(other.to_string())),
        }
    }
}

/// Resolve the key of `field` under `source`.
///
/// `Struct` always yields the declared name; other sources yield the
/// registered alias or `None`.
#[inline]
pub fn resolve(field: &FieldDescriptor, source: NameSource) -> Option<&'static str> {
    match source {
        NameSource::Struct => Some(field.name),
        other => field.alias(other),
    }
}

/// Resolve a key, turning a missing alias into an error when `strict`.
///
/// `path` is the dotted location of the record holding the field and is only
/// used for the error message.
pub fn resolve_strict(
    field: &FieldDescriptor,
    source: NameSource,
    strict: bool,
    path: &str,
) -> Result<Option<&'static str>, PatchError> {
    match resolve(field, source) {
        Some(key) => Ok(Some(key)),
        None if strict => Err(PatchError::missing_naming_annotation(
            crate::path::join(path, field.name),
            source,
        )),
        None => Ok(None),
    }
}
