//! `Patchable` impl generation.
//!
//! Emits a static field table plus index-based accessors. Field indices are
//! positions in the struct declaration, private fields included.

use crate::field_kind::FieldKind;
use crate::parse::{FieldInput, PatchableInput};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generate the `impl Patchable for {Name}` block.
pub fn generate(input: &PatchableInput) -> syn::Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields: Vec<(usize, &FieldInput, FieldKind)> = input
        .fields()
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            let kind = FieldKind::from_type(&field.ty, field.is_nested());
            (index, field, kind)
        })
        .collect();

    let descriptors = fields
        .iter()
        .map(|(index, field, kind)| generate_descriptor(*index, field, kind));

    // Only settable, non-skipped fields get accessors.
    let writable: Vec<_> = fields
        .iter()
        .filter(|(_, field, _)| field.is_settable() && !field.skip)
        .collect();

    let assign_arms = writable
        .iter()
        .filter_map(|(index, field, kind)| generate_assign_arm(*index, field, kind));

    let records: Vec<_> = writable
        .iter()
        .filter(|(_, _, kind)| kind.is_record())
        .collect();

    let reset_arms = records.iter().map(|(index, field, _)| {
        let ident = field.ident();
        quote! {
            #index => self.#ident = ::core::default::Default::default(),
        }
    });

    let nested_arms = records.iter().map(|(index, field, kind)| {
        let ident = field.ident();
        if kind.is_option() {
            quote! {
                #index => ::core::option::Option::Some(
                    self.#ident.get_or_insert_with(::core::default::Default::default)
                        as &mut dyn ::tirea_patch::Patchable,
                ),
            }
        } else {
            quote! {
                #index => ::core::option::Option::Some(
                    &mut self.#ident as &mut dyn ::tirea_patch::Patchable,
                ),
            }
        }
    });

    let nested_ref_arms = records.iter().map(|(index, field, kind)| {
        let ident = field.ident();
        if kind.is_option() {
            quote! {
                #index => self.#ident
                    .as_ref()
                    .map(|record| record as &dyn ::tirea_patch::Patchable),
            }
        } else {
            quote! {
                #index => ::core::option::Option::Some(
                    &self.#ident as &dyn ::tirea_patch::Patchable,
                ),
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::tirea_patch::Patchable for #struct_name #ty_generics #where_clause {
            fn patch_fields(&self) -> &'static [::tirea_patch::FieldDescriptor] {
                static FIELDS: &[::tirea_patch::FieldDescriptor] = &[
                    #(#descriptors),*
                ];
                FIELDS
            }

            fn patch_target(&mut self) -> ::core::option::Option<&mut dyn ::tirea_patch::Patchable> {
                ::core::option::Option::Some(self as &mut dyn ::tirea_patch::Patchable)
            }

            #[allow(unused_variables)]
            fn assign_field(
                &mut self,
                index: usize,
                value: ::serde_json::Value,
            ) -> ::core::result::Result<(), ::tirea_patch::FieldError> {
                match index {
                    #(#assign_arms)*
                    _ => ::core::result::Result::Err(::tirea_patch::FieldError::NotAssignable { index }),
                }
            }

            #[allow(clippy::match_single_binding)]
            fn reset_field(&mut self, index: usize) {
                match index {
                    #(#reset_arms)*
                    _ => {}
                }
            }

            #[allow(clippy::match_single_binding)]
            fn nested_field(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::tirea_patch::Patchable> {
                match index {
                    #(#nested_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(clippy::match_single_binding)]
            fn nested_ref(&self, index: usize) -> ::core::option::Option<&dyn ::tirea_patch::Patchable> {
                match index {
                    #(#nested_ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

fn generate_descriptor(index: usize, field: &FieldInput, kind: &FieldKind) -> TokenStream {
    let name = field.name();
    let shape = kind.shape_tokens();

    let mut tokens = quote! {
        ::tirea_patch::FieldDescriptor::new(#name, #index, #shape)
    };

    let aliases = field.aliases();
    if !aliases.is_empty() {
        let pairs = aliases.iter().map(|(source, key)| {
            let source = format_ident!("{}", source);
            quote!((::tirea_patch::NameSource::#source, #key))
        });
        tokens = quote!(#tokens.with_aliases(&[#(#pairs),*]));
    }

    let mode = if field.skip {
        Some(quote!(Skip))
    } else if field.replace {
        Some(quote!(Replace))
    } else if field.merge {
        Some(quote!(Merge))
    } else {
        None
    };
    if let Some(mode) = mode {
        tokens = quote!(#tokens.with_mode(::tirea_patch::PatchMode::#mode));
    }

    if !field.is_settable() {
        tokens = quote!(#tokens.read_only());
    }

    tokens
}

/// Record fields are only written through `nested_field`, except that an
/// optional record can be cleared with `null`.
fn generate_assign_arm(index: usize, field: &FieldInput, kind: &FieldKind) -> Option<TokenStream> {
    let ident = field.ident();
    match kind {
        FieldKind::Nested => None,
        FieldKind::Option(_) if kind.is_record() => Some(quote! {
            #index => {
                if value.is_null() {
                    self.#ident = ::core::option::Option::None;
                    ::core::result::Result::Ok(())
                } else {
                    ::core::result::Result::Err(::tirea_patch::FieldError::NotAssignable { index })
                }
            }
        }),
        _ => Some(quote! {
            #index => {
                self.#ident = ::serde_json::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    fn expand(input: syn::DeriveInput) -> String {
        let parsed = PatchableInput::from_derive_input(&input).unwrap();
        generate(&parsed).unwrap().to_string()
    }

    #[test]
    fn test_descriptor_table() {
        let out = expand(parse_quote! {
            struct User {
                #[patch(json = "username", bson = "")]
                pub username: String,
                secret: String,
                #[patch(skip)]
                pub id: u64,
            }
        });

        assert!(out.contains("FieldDescriptor :: new (\"username\" , 0usize"));
        assert!(out.contains("NameSource :: Json , \"username\""));
        assert!(out.contains("NameSource :: Bson , \"\""));
        assert!(out.contains("read_only ()"));
        assert!(out.contains("PatchMode :: Skip"));
    }

    #[test]
    fn test_private_and_skipped_fields_have_no_assign_arm() {
        let out = expand(parse_quote! {
            struct User {
                pub name: String,
                secret: String,
                #[patch(skip)]
                pub id: u64,
            }
        });

        assert!(out.contains("self . name = :: serde_json :: from_value (value) ?"));
        assert!(!out.contains("self . secret ="));
        assert!(!out.contains("self . id ="));
    }

    #[test]
    fn test_nested_accessors() {
        let out = expand(parse_quote! {
            struct User {
                #[patch(nested)]
                pub profile: Profile,
                #[patch(replace)]
                pub ban: Option<Box<Ban>>,
            }
        });

        assert!(out.contains("& mut self . profile as & mut dyn :: tirea_patch :: Patchable"));
        assert!(out.contains("self . ban . get_or_insert_with"));
        assert!(out.contains("& self . profile as & dyn :: tirea_patch :: Patchable"));
        assert!(out.contains("self . ban . as_ref () . map (| record | record as & dyn"));
        assert!(out.contains("self . ban = :: core :: option :: Option :: None"));
        assert!(out.contains("PatchMode :: Replace"));
        assert!(out.contains("FieldShape :: Optional (& :: tirea_patch :: FieldShape :: Record)"));
        assert!(!out.contains("self . profile = :: serde_json"));
    }

    #[test]
    fn test_generics_are_forwarded() {
        let out = expand(parse_quote! {
            struct Wrapper<T: Clone> where T: Default {
                pub value: T,
            }
        });
        assert!(out.contains("impl < T : Clone > :: tirea_patch :: Patchable for Wrapper < T >"));
        assert!(out.contains("FieldShape :: Any"));
    }
}
