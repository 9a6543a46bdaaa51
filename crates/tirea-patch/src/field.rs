//! Field metadata and the `Patchable` introspection capability.
//!
//! The walker never touches a struct directly. It reads a static table of
//! [`FieldDescriptor`]s and writes through the [`Patchable`] methods, which are
//! normally generated by `#[derive(Patchable)]`.

use crate::{FieldError, NameSource};
use serde_json::Value;

/// Declared shape of a struct field.
///
/// Used to decide whether an incoming value can be assigned directly, without
/// going through the coercer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `bool`
    Bool,
    /// Signed integers.
    Int,
    /// Unsigned integers.
    Uint,
    /// `f32` / `f64`
    Float,
    /// `String`, `char`
    String,
    /// `Vec<T>` and other sequences.
    Seq,
    /// `HashMap<K, V>` / `BTreeMap<K, V>`
    Map,
    /// A nested struct that is itself `Patchable`.
    Record,
    /// Anything else; deserialization decides.
    Any,
    /// `Option<T>` of the inner shape.
    Optional(&'static FieldShape),
}

impl FieldShape {
    /// Whether `value` has exactly this shape.
    ///
    /// Map and record shapes never match: object values for those fields go
    /// through coercion or nested traversal instead.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldShape::Optional(_), Value::Null) => true,
            (FieldShape::Optional(inner), v) => inner.accepts(v),
            (FieldShape::Bool, Value::Bool(_)) => true,
            (FieldShape::Int, Value::Number(n)) => n.is_i64(),
            (FieldShape::Uint, Value::Number(n)) => n.is_u64(),
            (FieldShape::Float, Value::Number(n)) => n.is_f64(),
            (FieldShape::String, Value::String(_)) => true,
            (FieldShape::Seq, Value::Array(_)) => true,
            (FieldShape::Any, _) => true,
            _ => false,
        }
    }

    /// Whether this shape is a record, possibly behind an `Option`.
    pub fn is_record(&self) -> bool {
        match self {
            FieldShape::Record => true,
            FieldShape::Optional(inner) => inner.is_record(),
            _ => false,
        }
    }

    /// The shape with any `Option` layers removed.
    pub fn innermost(&self) -> &FieldShape {
        match self {
            FieldShape::Optional(inner) => inner.innermost(),
            other => other,
        }
    }
}

/// Per-field patch behaviour override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchMode {
    /// Never patch this field.
    Skip,
    /// Patch the nested record's fields in place and report flattened keys.
    #[default]
    Merge,
    /// Reset the nested record to its default, then patch it; report the
    /// nested changes as one grouped value.
    Replace,
}

impl PatchMode {
    /// Lowercase name, as written in field attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchMode::Skip => "skip",
            PatchMode::Merge => "merge",
            PatchMode::Replace => "replace",
        }
    }
}

/// Static description of one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared Rust field name.
    pub name: &'static str,
    /// Position passed back to `Patchable` accessors.
    pub index: usize,
    /// Whether the field may be written at all.
    pub settable: bool,
    /// Declared shape.
    pub shape: FieldShape,
    /// Alternate names per naming source.
    pub aliases: &'static [(NameSource, &'static str)],
    /// Explicit mode override.
    pub mode: Option<PatchMode>,
}

impl FieldDescriptor {
    /// Create a settable descriptor with no aliases and no mode override.
    pub const fn new(name: &'static str, index: usize, shape: FieldShape) -> Self {
        Self {
            name,
            index,
            settable: true,
            shape,
            aliases: &[],
            mode: None,
        }
    }

    /// Attach naming-source aliases.
    pub const fn with_aliases(self, aliases: &'static [(NameSource, &'static str)]) -> Self {
        Self { aliases, ..self }
    }

    /// Attach a mode override.
    pub const fn with_mode(self, mode: PatchMode) -> Self {
        Self {
            mode: Some(mode),
            ..self
        }
    }

    /// Mark the field as not settable.
    pub const fn read_only(self) -> Self {
        Self {
            settable: false,
            ..self
        }
    }

    /// The alias registered for `source`, if any. Empty aliases count as absent.
    pub fn alias(&self, source: NameSource) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(s, alias)| *s == source && !alias.is_empty())
            .map(|(_, alias)| *alias)
    }

    /// Effective mode for nested records (`Merge` unless overridden).
    #[inline]
    pub fn mode(&self) -> PatchMode {
        self.mode.unwrap_or_default()
    }

    /// Whether the field is marked `skip`.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.mode == Some(PatchMode::Skip)
    }
}

/// Runtime field access for a struct.
///
/// Typically implemented via `#[derive(Patchable)]`. The trait is dyn-compatible
/// so the walker can descend through nested records of different types.
///
/// # Example
///
/// ```ignore
/// use tirea_patch::Patchable;
///
/// #[derive(Default, serde::Deserialize, Patchable)]
/// struct User {
///     #[patch(json = "username")]
///     pub username: String,
///     #[patch(json = "profile", nested)]
///     pub profile: Profile,
/// }
/// ```
pub trait Patchable {
    /// Field table for this record type.
    fn patch_fields(&self) -> &'static [FieldDescriptor];

    /// The record to patch, or `None` when there is nothing to patch
    /// (an empty `Option`).
    fn patch_target(&mut self) -> Option<&mut dyn Patchable>;

    /// Overwrite a field with a JSON value, deserializing into its type.
    fn assign_field(&mut self, index: usize, value: Value) -> Result<(), FieldError>;

    /// Reset a record field to its default value. No-op for other fields.
    fn reset_field(&mut self, index: usize);

    /// Mutable access to a record field, allocating a default through an
    /// empty `Option` first.
    fn nested_field(&mut self, index: usize) -> Option<&mut dyn Patchable>;

    /// Shared access to a record field. Never allocates, so an empty
    /// `Option` yields `None`.
    fn nested_ref(&self, index: usize) -> Option<&dyn Patchable>;
}

impl<T: Patchable + ?Sized> Patchable for Box<T> {
    fn patch_fields(&self) -> &'static [FieldDescriptor] {
        (**self).patch_fields()
    }

    fn patch_target(&mut self) -> Option<&mut dyn Patchable> {
        (**self).patch_target()
    }

    fn assign_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        (**self).assign_field(index, value)
    }

    fn reset_field(&mut self, index: usize) {
        (**self).reset_field(index)
    }

    fn nested_field(&mut self, index: usize) -> Option<&mut dyn Patchable> {
        (**self).nested_field(index)
    }

    fn nested_ref(&self, index: usize) -> Option<&dyn Patchable> {
        (**self).nested_ref(index)
    }
}

impl<T: Patchable> Patchable for Option<T> {
    fn patch_fields(&self) -> &'static [FieldDescriptor] {
        match self {
            Some(inner) => inner.patch_fields(),
            None => &[],
        }
    }

    fn patch_target(&mut self) -> Option<&mut dyn Patchable> {
        self.as_mut()?.patch_target()
    }

    fn assign_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match self {
            Some(inner) => inner.assign_field(index, value),
            None => Err(FieldError::NotAssignable { index }),
        }
    }

    fn reset_field(&mut self, index: usize) {
        if let Some(inner) = self {
            inner.reset_field(index);
        }
    }

    fn nested_field(&mut self, index: usize) -> Option<&mut dyn Patchable> {
        self.as_mut()?.nested_field(index)
    }

    fn nested_ref(&self, index: usize) -> Option<&dyn Patchable> {
        self.as_ref()?.nested_ref(index)
    }
}
