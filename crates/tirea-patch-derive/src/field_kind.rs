//! Field type analysis for code generation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type, TypePath};

/// The kind of a field, determining its `FieldShape` and how it is accessed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `bool`
    Bool,

    /// Signed integers.
    Int,

    /// Unsigned integers.
    Uint,

    /// `f32` / `f64`
    Float,

    /// `String`, `str`, `char`
    String,

    /// `Vec<T>` and other sequences.
    Seq,

    /// A BTreeMap<K, V> or HashMap<K, V> type
    Map,

    /// An Option<T> type
    Option(Box<FieldKind>),

    /// A nested Patchable type
    Nested,

    /// Anything else; left to serde.
    Other,
}

impl FieldKind {
    /// Analyze a type and determine its kind.
    ///
    /// The `is_nested_attr` flag marks the **leaf type** as nested. `Box<T>`
    /// is transparent and `Option<T>` is preserved.
    ///
    /// Examples:
    /// - `Option<Profile>` with `nested=true` → `Option(Nested)`
    /// - `Box<Profile>` with `nested=true` → `Nested`
    /// - `Vec<Profile>` with `nested=true` → `Seq`
    pub fn from_type(ty: &Type, is_nested_attr: bool) -> Self {
        match ty {
            Type::Path(type_path) => Self::from_type_path(type_path, is_nested_attr),
            Type::Reference(reference) => Self::from_type(&reference.elem, is_nested_attr),
            Type::Array(_) | Type::Slice(_) => FieldKind::Seq,
            _ => FieldKind::Other,
        }
    }

    fn from_type_path(type_path: &TypePath, is_nested_attr: bool) -> Self {
        let Some(segment) = type_path.path.segments.last() else {
            return FieldKind::Other;
        };

        match segment.ident.to_string().as_str() {
            "Option" => match extract_single_generic_arg(&segment.arguments) {
                Some(inner) => FieldKind::Option(Box::new(Self::from_type(inner, is_nested_attr))),
                None => FieldKind::Other,
            },
            "Box" => match extract_single_generic_arg(&segment.arguments) {
                Some(inner) => Self::from_type(inner, is_nested_attr),
                None => FieldKind::Other,
            },
            "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => FieldKind::Seq,
            "BTreeMap" | "HashMap" => FieldKind::Map,
            "bool" => FieldKind::Bool,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => FieldKind::Int,
            "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => FieldKind::Uint,
            "f32" | "f64" => FieldKind::Float,
            "String" | "str" | "char" => FieldKind::String,
            _ if is_nested_attr => FieldKind::Nested,
            _ => FieldKind::Other,
        }
    }

    /// Check if this is an Option type.
    pub fn is_option(&self) -> bool {
        matches!(self, FieldKind::Option(_))
    }

    /// Check if this is a nested type.
    pub fn is_nested(&self) -> bool {
        matches!(self, FieldKind::Nested)
    }

    /// Whether this kind can be entered as a nested record:
    /// `T`, `Box<T>`, `Option<T>` or `Option<Box<T>>`.
    pub fn is_record(&self) -> bool {
        match self {
            FieldKind::Nested => true,
            FieldKind::Option(inner) => inner.is_nested(),
            _ => false,
        }
    }

    /// Tokens of the matching `::tirea_patch::FieldShape` constant.
    pub fn shape_tokens(&self) -> TokenStream {
        let shape = quote!(::tirea_patch::FieldShape);
        match self {
            FieldKind::Bool => quote!(#shape::Bool),
            FieldKind::Int => quote!(#shape::Int),
            FieldKind::Uint => quote!(#shape::Uint),
            FieldKind::Float => quote!(#shape::Float),
            FieldKind::String => quote!(#shape::String),
            FieldKind::Seq => quote!(#shape::Seq),
            FieldKind::Map => quote!(#shape::Map),
            FieldKind::Nested => quote!(#shape::Record),
            FieldKind::Other => quote!(#shape::Any),
            FieldKind::Option(inner) => {
                let inner = inner.shape_tokens();
                quote!(#shape::Optional(&#inner))
            }
        }
    }
}

/// Extract a single generic type argument from path arguments.
fn extract_single_generic_arg(args: &PathArguments) -> Option<&Type> {
    match args {
        PathArguments::AngleBracketed(ab) => {
            if ab.args.len() == 1 {
                if let GenericArgument::Type(ty) = ab.args.first()? {
                    return Some(ty);
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_scalar_types() {
        let ty: Type = parse_quote!(String);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::String);

        let ty: Type = parse_quote!(i32);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Int);

        let ty: Type = parse_quote!(u8);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Uint);

        let ty: Type = parse_quote!(f32);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Float);

        let ty: Type = parse_quote!(bool);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Bool);
    }

    #[test]
    fn test_option_type() {
        let ty: Type = parse_quote!(Option<String>);
        let kind = FieldKind::from_type(&ty, false);
        assert!(kind.is_option());
        assert_eq!(kind, FieldKind::Option(Box::new(FieldKind::String)));
    }

    #[test]
    fn test_containers() {
        let ty: Type = parse_quote!(Vec<i32>);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Seq);

        let ty: Type = parse_quote!(std::collections::BTreeMap<String, i32>);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Map);
    }

    #[test]
    fn test_unknown_type_is_other_without_nested() {
        let ty: Type = parse_quote!(Profile);
        assert_eq!(FieldKind::from_type(&ty, false), FieldKind::Other);
    }

    #[test]
    fn test_nested_record_forms() {
        let types: [Type; 4] = [
            parse_quote!(Profile),
            parse_quote!(Box<Profile>),
            parse_quote!(Option<Profile>),
            parse_quote!(Option<Box<Profile>>),
        ];
        for ty in types {
            assert!(FieldKind::from_type(&ty, true).is_record(), "{ty:?}");
        }
    }

    #[test]
    fn test_nested_attr_on_non_records() {
        let ty: Type = parse_quote!(Vec<Profile>);
        assert!(!FieldKind::from_type(&ty, true).is_record());

        let ty: Type = parse_quote!(String);
        assert!(!FieldKind::from_type(&ty, true).is_record());

        let ty: Type = parse_quote!(Option<Option<Profile>>);
        assert!(!FieldKind::from_type(&ty, true).is_record());
    }

    #[test]
    fn test_shape_tokens() {
        let kind = FieldKind::Option(Box::new(FieldKind::Nested));
        let expected = quote!(::tirea_patch::FieldShape::Optional(
            &::tirea_patch::FieldShape::Record
        ));
        assert_eq!(kind.shape_tokens().to_string(), expected.to_string());
    }
}
