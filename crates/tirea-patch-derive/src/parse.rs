//! Parsing logic for Patchable derive macro.

use darling::{ast, FromDeriveInput, FromField};
use syn::ext::IdentExt;
use syn::{Generics, Ident, Type, Visibility};

/// Parsed struct-level options.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(patch), supports(struct_named))]
pub struct PatchableInput {
    /// The struct identifier.
    pub ident: Ident,

    /// Generic parameters.
    pub generics: Generics,

    /// Struct data (fields).
    pub data: ast::Data<(), FieldInput>,
}

impl PatchableInput {
    /// Get the fields as a vector.
    pub fn fields(&self) -> Vec<&FieldInput> {
        self.data
            .as_ref()
            .take_struct()
            .map(|s| s.fields.to_vec())
            .unwrap_or_default()
    }
}

/// Parsed field-level options.
#[derive(Debug, FromField)]
#[darling(attributes(patch))]
pub struct FieldInput {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Field visibility. Private fields cannot be patched.
    pub vis: Visibility,

    /// Field type.
    pub ty: Type,

    /// Key under the `json` naming source.
    #[darling(default)]
    pub json: Option<String>,

    /// Key under the `bson` naming source.
    #[darling(default)]
    pub bson: Option<String>,

    /// Key under the `mapstructure` naming source.
    #[darling(default)]
    pub mapstructure: Option<String>,

    /// Key under the `msgpack` naming source.
    #[darling(default)]
    pub msgpack: Option<String>,

    /// Never patch this field.
    #[darling(default)]
    pub skip: bool,

    /// Patch a nested record field by field.
    #[darling(default)]
    pub nested: bool,

    /// Same as `nested`, stated explicitly.
    #[darling(default)]
    pub merge: bool,

    /// Reset a nested record before patching it.
    #[darling(default)]
    pub replace: bool,
}

impl FieldInput {
    /// Get the field identifier (panics if None).
    pub fn ident(&self) -> &Ident {
        self.ident.as_ref().expect("named field required")
    }

    /// Declared name, without any `r#` prefix.
    pub fn name(&self) -> String {
        self.ident().unraw().to_string()
    }

    /// Whether the field is visible outside its struct.
    pub fn is_settable(&self) -> bool {
        !matches!(self.vis, Visibility::Inherited)
    }

    /// Whether the field is a record patched through its own fields.
    pub fn is_nested(&self) -> bool {
        self.nested || self.merge || self.replace
    }

    /// Aliases as `(NameSource variant, key)` pairs, in source order.
    pub fn aliases(&self) -> Vec<(&'static str, &str)> {
        [
            ("Json", &self.json),
            ("Bson", &self.bson),
            ("Mapstructure", &self.mapstructure),
            ("Msgpack", &self.msgpack),
        ]
        .into_iter()
        .filter_map(|(source, key)| key.as_deref().map(|key| (source, key)))
        .collect()
    }

    /// Mode flags that were set, by name.
    pub fn modes(&self) -> Vec<&'static str> {
        [
            ("skip", self.skip),
            ("merge", self.merge),
            ("replace", self.replace),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}
