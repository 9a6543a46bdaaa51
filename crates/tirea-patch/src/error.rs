//! Error types for tirea-patch operations.

use crate::NameSource;
use thiserror::Error;

/// Errors that abort a patch call.
///
/// A failed call never returns a partial `PatchResult`. Fields assigned before
/// the failure was discovered keep their new values.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The destination cannot be patched (for example an empty `Option`).
    #[error("invalid destination: {reason}")]
    InvalidDestination {
        /// Why the destination was refused.
        reason: String,
    },

    /// The patch document is not a JSON object.
    #[error("patch must be an object, found {found}")]
    InvalidPatch {
        /// The JSON type that was supplied instead.
        found: &'static str,
    },

    /// A field lacks the alias required by a strict naming source.
    #[error("field `{field}` is missing tag `{tag}`")]
    MissingNamingAnnotation {
        /// Dotted path of the field.
        field: String,
        /// The naming source that had no alias.
        tag: NameSource,
    },

    /// A field present in the patch was rejected by permission rules.
    #[error("field `{field}` is not permitted due to `{cause}`")]
    UnpermittedField {
        /// Dotted path of the field.
        field: String,
        /// What rejected it.
        cause: String,
    },
}

impl PatchError {
    /// Create an invalid destination error.
    #[inline]
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        PatchError::InvalidDestination {
            reason: reason.into(),
        }
    }

    /// Create an invalid patch error for a non-object document.
    #[inline]
    pub fn invalid_patch(found: &serde_json::Value) -> Self {
        PatchError::InvalidPatch {
            found: value_type_name(found),
        }
    }

    /// Create a missing naming annotation error.
    #[inline]
    pub fn missing_naming_annotation(field: impl Into<String>, tag: NameSource) -> Self {
        PatchError::MissingNamingAnnotation {
            field: field.into(),
            tag,
        }
    }

    /// Create an unpermitted field error.
    #[inline]
    pub fn unpermitted(field: impl Into<String>, cause: impl Into<String>) -> Self {
        PatchError::UnpermittedField {
            field: field.into(),
            cause: cause.into(),
        }
    }
}

/// Failure to write a single field through the `Patchable` capability.
///
/// The walker treats these as "not applicable" and moves on; they never reach
/// the caller.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The index does not name an assignable field.
    #[error("field index {index} is not assignable")]
    NotAssignable {
        /// The index that was addressed.
        index: usize,
    },

    /// The value could not be deserialized into the field's type.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = PatchError::missing_naming_annotation("profile.motto", NameSource::Bson);
        assert_eq!(err.to_string(), "field `profile.motto` is missing tag `bson`");

        let err = PatchError::unpermitted("is_banned", "permitted fields");
        assert_eq!(
            err.to_string(),
            "field `is_banned` is not permitted due to `permitted fields`"
        );
    }

    #[test]
    fn test_invalid_patch_reports_type() {
        let err = PatchError::invalid_patch(&json!([1, 2]));
        assert!(matches!(err, PatchError::InvalidPatch { found: "array" }));
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "boolean");
        assert_eq!(value_type_name(&json!(42)), "number");
        assert_eq!(value_type_name(&json!("hello")), "string");
        assert_eq!(value_type_name(&json!([1, 2, 3])), "array");
        assert_eq!(value_type_name(&json!({"a": 1})), "object");
    }
}
