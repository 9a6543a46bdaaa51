//! Code generation for Patchable derive macro.

mod patchable;

use crate::field_kind::FieldKind;
use crate::parse::PatchableInput;
use darling::FromDeriveInput;
use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Main entry point for code generation.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = PatchableInput::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    // Validate field attributes
    for field in parsed.fields() {
        let modes = field.modes();
        if modes.len() > 1 {
            return Err(syn::Error::new_spanned(
                field.ident(),
                format!(
                    "#[patch({})] cannot be used together. \
                     A field is either skipped, merged or replaced.",
                    modes.join(", ")
                ),
            ));
        }

        if field.skip && field.nested {
            return Err(syn::Error::new_spanned(
                field.ident(),
                "#[patch(skip)] and #[patch(nested)] cannot be used together. \
                 Skipped fields are never patched.",
            ));
        }

        if field.is_nested() {
            let kind = FieldKind::from_type(&field.ty, /* is_nested_attr = */ true);
            if !kind.is_record() {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "#[patch(nested)], #[patch(merge)] and #[patch(replace)] only support \
                     struct fields, optionally wrapped in Box or Option. \
                     The struct must implement Patchable and Default.",
                ));
            }
        }
    }

    patchable::generate(&parsed)
}
