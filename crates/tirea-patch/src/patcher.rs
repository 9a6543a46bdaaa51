//! The patch entry point.

use crate::coerce::{Coercer, CoercerRegistry};
use crate::error::value_type_name;
use crate::walker::Walker;
use crate::{
    FieldPath, PatchError, PatchResult, Patchable, PatcherConfig, PermittedFields, SkipCondition,
};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// Applies partial updates to `Patchable` records.
///
/// A `Patcher` is immutable once built and can be shared across threads; every
/// call to [`Patcher::patch`] works on its own destination and result.
///
/// # Examples
///
/// ```ignore
/// use tirea_patch::{NameSource, Patcher, PatcherConfig, Patchable};
/// use serde_json::json;
///
/// #[derive(Default, Patchable)]
/// pub struct User {
///     #[patch(json = "username")]
///     pub username: String,
/// }
///
/// let patcher = Patcher::new(PatcherConfig::new().with_source(NameSource::Json));
/// let mut user = User::default();
/// let patch = json!({"username": "alice"});
/// let result = patcher.patch(&mut user, patch.as_object().unwrap()).unwrap();
/// assert_eq!(result.fields, vec!["username"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Patcher {
    config: PatcherConfig,
    permitted: PermittedFields,
    coercers: CoercerRegistry,
    skip_conditions: Vec<SkipCondition>,
}

impl Patcher {
    /// Create a patcher from a configuration, with no coercers or skip
    /// conditions.
    pub fn new(config: PatcherConfig) -> Self {
        let permitted = config.permitted();
        Self {
            config,
            permitted,
            coercers: CoercerRegistry::new(),
            skip_conditions: Vec::new(),
        }
    }

    /// Register a coercer after the existing ones.
    #[must_use]
    pub fn with_coercer(mut self, coercer: impl Coercer + 'static) -> Self {
        self.coercers.register(coercer);
        self
    }

    /// Register several shared coercers, in order.
    #[must_use]
    pub fn with_coercers<I>(mut self, coercers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Coercer>>,
    {
        for coercer in coercers {
            self.coercers.register_shared(coercer);
        }
        self
    }

    /// Add a skip condition. A field is hidden if any condition matches.
    #[must_use]
    pub fn with_skip_condition(mut self, condition: SkipCondition) -> Self {
        self.skip_conditions.push(condition);
        self
    }

    /// The configuration this patcher was built from.
    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Registered coercers.
    pub fn coercers(&self) -> &CoercerRegistry {
        &self.coercers
    }

    /// Registered skip conditions.
    pub fn skip_conditions(&self) -> &[SkipCondition] {
        &self.skip_conditions
    }

    /// Apply `patch` to `dest` in place.
    ///
    /// Returns [`PatchError::InvalidDestination`] when `dest` has nothing to
    /// patch, for example an empty `Option`. On any other error, fields
    /// written before the failure keep their new values.
    pub fn patch<T>(&self, dest: &mut T, patch: &Map<String, Value>) -> Result<PatchResult, PatchError>
    where
        T: Patchable + ?Sized,
    {
        let Some(target) = dest.patch_target() else {
            return Err(PatchError::invalid_destination(
                "destination does not reference a record",
            ));
        };

        let walker = Walker::new(&self.config, &self.coercers, &self.skip_conditions);
        let result = walker
            .walk(target, patch, &self.permitted, &FieldPath::root())?
            .embed(&self.config.embed_path);

        tracing::trace!(
            updated = result.fields.len(),
            unpermitted = result.unpermitted.len(),
            "patch applied"
        );
        Ok(result)
    }

    /// Apply a patch given as an arbitrary JSON value.
    ///
    /// The destination is checked first; a non-object patch then yields
    /// [`PatchError::InvalidPatch`].
    pub fn patch_value<T>(&self, dest: &mut T, patch: &Value) -> Result<PatchResult, PatchError>
    where
        T: Patchable + ?Sized,
    {
        if dest.patch_target().is_none() {
            return Err(PatchError::invalid_destination(
                "destination does not reference a record",
            ));
        }
        match patch {
            Value::Object(map) => self.patch(dest, map),
            other => {
                tracing::debug!(found = value_type_name(other), "rejecting non-object patch");
                Err(PatchError::invalid_patch(other))
            }
        }
    }
}

/// Process-wide patcher with the default configuration.
///
/// Built lazily on first use and shared by every caller.
pub fn default_patcher() -> &'static Patcher {
    static DEFAULT: OnceLock<Patcher> = OnceLock::new();
    DEFAULT.get_or_init(Patcher::default)
}
