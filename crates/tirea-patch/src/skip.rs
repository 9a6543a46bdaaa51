//! Skip conditions.
//!
//! A skip condition hides a field from the patcher entirely: the field is
//! treated as if it were not settable, so it is neither patched nor reported
//! as unpermitted.

use crate::{FieldDescriptor, NameSource};
use std::fmt;
use std::sync::Arc;

/// Shared predicate deciding whether a field is skipped.
#[derive(Clone)]
pub struct SkipCondition {
    name: String,
    predicate: Arc<dyn Fn(&FieldDescriptor) -> bool + Send + Sync>,
}

impl SkipCondition {
    /// Wrap a predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Skip fields whose declared name is `name`.
    pub fn field_named(name: impl Into<String>) -> Self {
        let target: String = name.into();
        let label = format!("field_named({target})");
        Self::new(label, move |field| field.name == target)
    }

    /// Skip fields that have no alias for `source`.
    pub fn missing_alias(source: NameSource) -> Self {
        Self::new(format!("missing_alias({source})"), move |field| {
            crate::naming::resolve(field, source).is_none()
        })
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the condition.
    #[inline]
    pub fn matches(&self, field: &FieldDescriptor) -> bool {
        (self.predicate)(field)
    }
}

impl fmt::Debug for SkipCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipCondition")
            .field("name", &self.name)
            .finish()
    }
}
