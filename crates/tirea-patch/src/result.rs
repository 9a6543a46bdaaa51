//! Patch results and their aggregation across nested records.
//!
//! Each record level builds its own `PatchResult` with keys relative to that
//! record. The parent folds a child result in according to the child's mode:
//!
//! - `Merge`: every child key is prefixed with the field key, so
//!   `{"motto": "hi"}` under `profile` becomes `{"profile.motto": "hi"}`.
//! - `Replace`: the field key alone is reported, and the child's map is kept
//!   as one grouped value: `{"ban_data": {"length": 30}}`.

use crate::naming::resolve_strict;
use crate::path::join;
use crate::{FieldDescriptor, NameSource, PatchError, PatchMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a patch call changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchResult {
    /// Updated fields, in the order they were applied. Nested fields are
    /// dotted.
    pub fields: Vec<String>,
    /// Fields present in the patch but rejected, as dotted input-key paths.
    pub unpermitted: Vec<String>,
    /// Applied values keyed by output name.
    pub map: Map<String, Value>,
}

impl PatchResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing was updated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.map.is_empty()
    }

    /// Whether any field was rejected.
    pub fn has_unpermitted(&self) -> bool {
        !self.unpermitted.is_empty()
    }
}

/// Output naming settings shared by every level of one patch call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputNaming {
    pub field_source: NameSource,
    pub field_errors: bool,
    pub map_source: NameSource,
    pub map_errors: bool,
}

impl OutputNaming {
    fn keys(
        &self,
        field: &FieldDescriptor,
        path: &str,
    ) -> Result<(Option<&'static str>, Option<&'static str>), PatchError> {
        let field_key = resolve_strict(field, self.field_source, self.field_errors, path)?;
        let map_key = resolve_strict(field, self.map_source, self.map_errors, path)?;
        Ok((field_key, map_key))
    }
}

impl PatchResult {
    /// Record a directly assigned field.
    pub(crate) fn record_field(
        &mut self,
        naming: &OutputNaming,
        field: &FieldDescriptor,
        path: &str,
        value: Value,
    ) -> Result<(), PatchError> {
        let (field_key, map_key) = naming.keys(field, path)?;
        if let Some(key) = field_key {
            self.fields.push(key.to_string());
        }
        if let Some(key) = map_key {
            self.map.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Fold the result of a nested record into this one.
    pub(crate) fn merge_nested(
        &mut self,
        naming: &OutputNaming,
        field: &FieldDescriptor,
        path: &str,
        mode: PatchMode,
        child: PatchResult,
    ) -> Result<(), PatchError> {
        let (field_key, map_key) = naming.keys(field, path)?;
        self.unpermitted.extend(child.unpermitted);

        match mode {
            PatchMode::Replace => {
                if let Some(key) = field_key {
                    self.fields.push(key.to_string());
                }
                if let Some(key) = map_key {
                    self.map.insert(key.to_string(), Value::Object(child.map));
                }
            }
            PatchMode::Merge => {
                if let Some(key) = field_key {
                    self.fields
                        .extend(child.fields.iter().map(|f| join(key, f)));
                }
                if let Some(key) = map_key {
                    for (k, v) in child.map {
                        self.map.insert(join(key, &k), v);
                    }
                }
            }
            // Skipped fields are rejected while planning and never descended
            // into, so there are no child updates to report.
            PatchMode::Skip => {}
        }
        Ok(())
    }

    /// Prefix every map key with `embed_path`.
    pub(crate) fn embed(mut self, embed_path: &str) -> Self {
        if embed_path.is_empty() {
            return self;
        }
        let map = std::mem::take(&mut self.map);
        self.map = map
            .into_iter()
            .map(|(k, v)| (join(embed_path, &k), v))
            .collect();
        self
    }
}
