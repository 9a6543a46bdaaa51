//! Patcher configuration.

use crate::{NameSource, PermittedFields};
use serde::{Deserialize, Serialize};

/// Configuration used to build a [`Patcher`](crate::Patcher).
///
/// Every field has a zero default, so a config can be deserialized from a
/// partial document:
///
/// ```
/// use tirea_patch::{NameSource, PatcherConfig};
///
/// let config: PatcherConfig = serde_json::from_str(
///     r#"{"patch_source": "json", "permitted_fields": ["username"], "unpermitted_errors": true}"#,
/// )
/// .unwrap();
/// assert_eq!(config.patch_source, NameSource::Json);
/// assert!(config.embed_path.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    /// Dotted prefix applied to every key of `PatchResult::map`.
    ///
    /// With `"profile.metadata"`, an update of `updated_at` is reported as
    /// `"profile.metadata.updated_at"`.
    pub embed_path: String,

    /// Naming source of the patch map's keys.
    pub patch_source: NameSource,

    /// Abort when a field has no alias for `patch_source` instead of
    /// ignoring it.
    pub patch_source_errors: bool,

    /// Naming source of `PatchResult::map` keys.
    pub updated_map_source: NameSource,

    /// Abort when a patched field has no alias for `updated_map_source`.
    ///
    /// Fields patched before the error keep their new values.
    pub updated_map_errors: bool,

    /// Naming source of `PatchResult::fields` entries.
    pub updated_field_source: NameSource,

    /// Abort when a patched field has no alias for `updated_field_source`.
    ///
    /// Fields patched before the error keep their new values.
    pub updated_field_errors: bool,

    /// Allow-list of dotted field paths in `patch_source` naming. Empty
    /// permits everything; `profile.*` permits a whole nested record.
    pub permitted_fields: Vec<String>,

    /// Abort on a present but unpermitted field instead of recording it in
    /// `PatchResult::unpermitted`.
    ///
    /// Every present field of a record is checked before any field of that
    /// record is written.
    pub unpermitted_errors: bool,
}

impl PatcherConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embed path.
    #[must_use]
    pub fn with_embed_path(mut self, embed_path: impl Into<String>) -> Self {
        self.embed_path = embed_path.into();
        self
    }

    /// Set the patch map naming source.
    #[must_use]
    pub fn with_patch_source(mut self, source: NameSource) -> Self {
        self.patch_source = source;
        self
    }

    /// Make a missing patch-source alias an error.
    #[must_use]
    pub fn with_patch_source_errors(mut self, enabled: bool) -> Self {
        self.patch_source_errors = enabled;
        self
    }

    /// Set the naming source of `PatchResult::map`.
    #[must_use]
    pub fn with_updated_map_source(mut self, source: NameSource) -> Self {
        self.updated_map_source = source;
        self
    }

    /// Make a missing map alias an error.
    #[must_use]
    pub fn with_updated_map_errors(mut self, enabled: bool) -> Self {
        self.updated_map_errors = enabled;
        self
    }

    /// Set the naming source of `PatchResult::fields`.
    #[must_use]
    pub fn with_updated_field_source(mut self, source: NameSource) -> Self {
        self.updated_field_source = source;
        self
    }

    /// Make a missing field-list alias an error.
    #[must_use]
    pub fn with_updated_field_errors(mut self, enabled: bool) -> Self {
        self.updated_field_errors = enabled;
        self
    }

    /// Use one naming source for input and both outputs.
    #[must_use]
    pub fn with_source(self, source: NameSource) -> Self {
        self.with_patch_source(source)
            .with_updated_map_source(source)
            .with_updated_field_source(source)
    }

    /// Set the permission list.
    #[must_use]
    pub fn with_permitted_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permitted_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Make unpermitted fields an error.
    #[must_use]
    pub fn with_unpermitted_errors(mut self, enabled: bool) -> Self {
        self.unpermitted_errors = enabled;
        self
    }

    /// The permission list as a matcher.
    pub fn permitted(&self) -> PermittedFields {
        PermittedFields::new(self.permitted_fields.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_zero_value() {
        let config = PatcherConfig::default();
        assert_eq!(config.embed_path, "");
        assert_eq!(config.patch_source, NameSource::Struct);
        assert_eq!(config.updated_field_source, NameSource::Struct);
        assert_eq!(config.updated_map_source, NameSource::Struct);
        assert!(config.permitted_fields.is_empty());
        assert!(!config.unpermitted_errors);
        assert!(!config.patch_source_errors);
        assert!(!config.updated_field_errors);
        assert!(!config.updated_map_errors);
    }

    #[test]
    fn test_builder() {
        let config = PatcherConfig::new()
            .with_source(NameSource::Json)
            .with_updated_map_source(NameSource::Bson)
            .with_permitted_fields(["username", "email_address"])
            .with_unpermitted_errors(true)
            .with_embed_path("account");

        assert_eq!(config.patch_source, NameSource::Json);
        assert_eq!(config.updated_field_source, NameSource::Json);
        assert_eq!(config.updated_map_source, NameSource::Bson);
        assert!(config.unpermitted_errors);
        assert!(config.permitted().permits("username"));
        assert!(!config.permitted().permits("is_banned"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: PatcherConfig = serde_json::from_value(json!({
            "patch_source": "json",
            "updated_map_source": "bson",
            "updated_map_errors": true,
        }))
        .unwrap();

        assert_eq!(config.patch_source, NameSource::Json);
        assert_eq!(config.updated_map_source, NameSource::Bson);
        assert!(config.updated_map_errors);
        assert_eq!(config.updated_field_source, NameSource::Struct);
    }

    #[test]
    fn test_deserialize_rejects_unknown_source() {
        let err = serde_json::from_value::<PatcherConfig>(json!({"patch_source": "yaml"}));
        assert!(err.is_err());
    }
}
