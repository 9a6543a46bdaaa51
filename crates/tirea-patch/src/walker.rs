//! Recursive traversal of a record and its nested records.
//!
//! Each record level is processed in two passes. The planning pass resolves
//! input keys and checks permissions for every field present in the patch, so
//! a strict permission failure aborts before anything at that level is
//! written. The apply pass then writes fields in declaration order, descending
//! into nested records as it goes. A nested record is planned before it is
//! reset or allocated.
//!
//! Nothing is rolled back on error: fields written at shallower levels, or in
//! nested records finished earlier, keep their new values.

use crate::coerce::CoercerRegistry;
use crate::error::value_type_name;
use crate::naming::resolve_strict;
use crate::permission::{Access, PermittedFields};
use crate::result::OutputNaming;
use crate::{
    FieldDescriptor, FieldPath, PatchError, PatchMode, PatchResult, Patchable, PatcherConfig,
    SkipCondition,
};
use serde_json::{Map, Value};

const CAUSE_SKIP: &str = "patch(skip)";
const CAUSE_PERMITTED: &str = "permitted_fields";

pub(crate) struct Walker<'p> {
    config: &'p PatcherConfig,
    naming: OutputNaming,
    coercers: &'p CoercerRegistry,
    skip_conditions: &'p [SkipCondition],
}

/// A present, permitted field waiting to be applied.
struct Planned<'a> {
    field: &'static FieldDescriptor,
    key: &'static str,
    path: FieldPath,
    value: &'a Value,
    access: Access,
}

impl<'p> Walker<'p> {
    pub(crate) fn new(
        config: &'p PatcherConfig,
        coercers: &'p CoercerRegistry,
        skip_conditions: &'p [SkipCondition],
    ) -> Self {
        Self {
            config,
            naming: OutputNaming {
                field_source: config.updated_field_source,
                field_errors: config.updated_field_errors,
                map_source: config.updated_map_source,
                map_errors: config.updated_map_errors,
            },
            coercers,
            skip_conditions,
        }
    }

    /// Patch one record. Keys of the returned result are relative to it.
    pub(crate) fn walk(
        &self,
        target: &mut dyn Patchable,
        patch: &Map<String, Value>,
        permitted: &PermittedFields,
        path: &FieldPath,
    ) -> Result<PatchResult, PatchError> {
        let mut result = PatchResult::new();
        let plan = self.plan(target.patch_fields(), patch, permitted, path, &mut result)?;
        self.apply_all(target, plan, permitted, path, &mut result)?;
        Ok(result)
    }

    fn apply_all(
        &self,
        target: &mut dyn Patchable,
        plan: Vec<Planned<'_>>,
        permitted: &PermittedFields,
        path: &FieldPath,
        result: &mut PatchResult,
    ) -> Result<(), PatchError> {
        let parent = path.to_string();
        for step in plan {
            self.apply(target, step, permitted, &parent, result)?;
        }
        Ok(())
    }

    fn plan<'a>(
        &self,
        fields: &'static [FieldDescriptor],
        patch: &'a Map<String, Value>,
        permitted: &PermittedFields,
        path: &FieldPath,
        result: &mut PatchResult,
    ) -> Result<Vec<Planned<'a>>, PatchError> {
        let parent = path.to_string();
        let mut plan = Vec::new();

        for field in fields {
            if !field.settable || self.hidden(field) {
                continue;
            }

            let Some(key) = resolve_strict(
                field,
                self.config.patch_source,
                self.config.patch_source_errors,
                &parent,
            )?
            else {
                continue;
            };

            let Some(value) = patch.get(key) else {
                continue;
            };

            let full = path.child(key);
            match Self::access(field, key, value, permitted) {
                Ok(access) => plan.push(Planned {
                    field,
                    key,
                    path: full,
                    value,
                    access,
                }),
                Err(cause) if self.config.unpermitted_errors => {
                    return Err(PatchError::unpermitted(full.to_string(), cause));
                }
                Err(cause) => {
                    tracing::debug!(field = %full, cause, "ignoring unpermitted field");
                    result.unpermitted.push(full.to_string());
                }
            }
        }

        Ok(plan)
    }

    /// Skip tags win over the permission list. A `replace` record resets
    /// every child, so it needs the whole field permitted.
    fn access(
        field: &FieldDescriptor,
        key: &str,
        value: &Value,
        permitted: &PermittedFields,
    ) -> Result<Access, &'static str> {
        if field.is_skipped() {
            return Err(CAUSE_SKIP);
        }
        match permitted.check(key) {
            Access::Full => Ok(Access::Full),
            Access::Descendants
                if field.shape.is_record()
                    && value.is_object()
                    && field.mode() != PatchMode::Replace =>
            {
                Ok(Access::Descendants)
            }
            _ => Err(CAUSE_PERMITTED),
        }
    }

    fn hidden(&self, field: &FieldDescriptor) -> bool {
        match self.skip_conditions.iter().find(|c| c.matches(field)) {
            Some(condition) => {
                tracing::trace!(field = field.name, condition = condition.name(), "field skipped");
                true
            }
            None => false,
        }
    }

    fn apply(
        &self,
        target: &mut dyn Patchable,
        step: Planned<'_>,
        permitted: &PermittedFields,
        parent: &str,
        result: &mut PatchResult,
    ) -> Result<(), PatchError> {
        let Planned {
            field,
            key,
            path,
            value,
            access,
        } = step;

        if access == Access::Full {
            if field.shape.accepts(value) {
                match target.assign_field(field.index, value.clone()) {
                    Ok(()) => return result.record_field(&self.naming, field, parent, value.clone()),
                    Err(err) => {
                        tracing::trace!(field = %path, error = %err, "direct assignment failed");
                    }
                }
            }

            let coerced = self.coercers.apply(field, value, |converted| {
                target.assign_field(field.index, converted).is_ok()
            });
            if let Some(converted) = coerced {
                return result.record_field(&self.naming, field, parent, converted);
            }
        }

        match value {
            Value::Object(child_patch) if field.shape.is_record() => {
                self.descend(target, field, key, &path, child_patch, permitted, parent, result)
            }
            _ => {
                tracing::trace!(
                    field = %path,
                    found = value_type_name(value),
                    "no applicable assignment; field left untouched"
                );
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn descend(
        &self,
        target: &mut dyn Patchable,
        field: &'static FieldDescriptor,
        key: &str,
        path: &FieldPath,
        child_patch: &Map<String, Value>,
        permitted: &PermittedFields,
        parent: &str,
        result: &mut PatchResult,
    ) -> Result<(), PatchError> {
        let mode = field.mode();
        let was_empty = target.nested_ref(field.index).is_none();
        let Some(child) = target.nested_field(field.index) else {
            tracing::trace!(field = %path, "record field is not reachable");
            return Ok(());
        };

        let child_permitted = permitted.narrow(key);
        let mut child_result = PatchResult::new();
        let plan = match self.plan(
            child.patch_fields(),
            child_patch,
            &child_permitted,
            path,
            &mut child_result,
        ) {
            Ok(plan) => plan,
            Err(err) => {
                // Undo the allocation of an empty `Option`.
                if was_empty {
                    target.reset_field(field.index);
                }
                return Err(err);
            }
        };

        if mode == PatchMode::Replace {
            target.reset_field(field.index);
        }
        let Some(child) = target.nested_field(field.index) else {
            return Ok(());
        };
        self.apply_all(child, plan, &child_permitted, path, &mut child_result)?;
        result.merge_nested(&self.naming, field, parent, mode, child_result)
    }
}
