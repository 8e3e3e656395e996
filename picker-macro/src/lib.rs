use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Meta, Type, parse_macro_input};

/// Derive the `Parameters` trait, making `#[param]` fields authorable
/// through a typed slot's parameter blob.
///
/// Only fields marked `#[param]` take part. Their kind is inferred from the
/// last path segment of the field type: `f32`, `i32`, `bool` and `String`
/// are supported. A marked field of any other type is kept in the schema
/// as unsupported and skipped with a diagnostic at runtime.
///
/// # Attributes
///
/// ```ignore
/// #[derive(Default, Parameters)]
/// #[params(identity = "shapes::Circle")] // default: module_path!()::Circle
/// struct Circle {
///     #[param]
///     radius: f32,
///     #[param(label = "Outline")]
///     outline_width: f32,
///     area_cache: f32, // not authored
/// }
/// ```
#[proc_macro_derive(Parameters, attributes(param, params))]
pub fn derive_parameters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Value kind inferred from a field type.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Float,
    Int,
    Bool,
    Text,
    Unsupported,
}

/// A `#[param]` field.
struct ParamField<'a> {
    ident: &'a syn::Ident,
    name: String,
    ty: &'a Type,
    kind: Kind,
    label: Option<LitStr>,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Parameters cannot be derived for generic types; each type needs a single identity",
        ));
    }

    let identity = match struct_identity(&input.attrs)? {
        Some(identity) => quote! { #identity },
        None => quote! { ::core::concat!(::core::module_path!(), "::", #name_str) },
    };

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let mut params = Vec::new();
                for field in &fields.named {
                    let Some(label) = param_attr(&field.attrs)? else {
                        continue;
                    };
                    let Some(ident) = field.ident.as_ref() else {
                        continue;
                    };
                    params.push(ParamField {
                        ident,
                        name: ident.unraw().to_string(),
                        ty: &field.ty,
                        kind: infer_field_kind(&field.ty),
                        label,
                    });
                }
                params
            }
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Parameters requires named fields; blob keys are field names",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Parameters can only be derived for structs",
            ));
        }
    };

    let schema_fields = fields.iter().map(|f| {
        let fname = &f.name;
        let kind = kind_tokens(f);
        match &f.label {
            Some(label) => quote! { .labeled(#fname, #kind, #label) },
            None => quote! { .field(#fname, #kind) },
        }
    });

    let supported: Vec<_> = fields
        .iter()
        .filter(|f| f.kind != Kind::Unsupported)
        .collect();

    let get_arms = supported.iter().map(|f| {
        let fname = &f.name;
        let ident = f.ident;
        let read = if f.kind == Kind::Text {
            quote! { ::core::clone::Clone::clone(&self.#ident) }
        } else {
            quote! { self.#ident }
        };
        quote! {
            #fname => ::core::option::Option::Some(::type_picker::FieldValue::from(#read))
        }
    });

    let set_arms = supported.iter().map(|f| {
        let fname = &f.name;
        let ident = f.ident;
        let variant = match f.kind {
            Kind::Float => quote! { Float },
            Kind::Int => quote! { Int },
            Kind::Bool => quote! { Bool },
            _ => quote! { Text },
        };
        quote! {
            (#fname, ::type_picker::FieldValue::#variant(v)) => {
                self.#ident = v;
                true
            }
        }
    });

    Ok(quote! {
        impl ::type_picker::Parameters for #name {
            fn identity() -> &'static str {
                #identity
            }

            fn schema() -> &'static ::type_picker::TypeSchema {
                static SCHEMA: ::std::sync::LazyLock<::type_picker::TypeSchema> =
                    ::std::sync::LazyLock::new(|| {
                        ::type_picker::TypeSchema::builder(#name_str)
                            #(#schema_fields)*
                            .build()
                    });
                &SCHEMA
            }

            fn param_schema(&self) -> &'static ::type_picker::TypeSchema {
                <Self as ::type_picker::Parameters>::schema()
            }

            fn get_param(&self, name: &str) -> ::core::option::Option<::type_picker::FieldValue> {
                match name {
                    #(#get_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_param(&mut self, name: &str, value: ::type_picker::FieldValue) -> bool {
                match (name, value) {
                    #(#set_arms)*
                    _ => false,
                }
            }
        }
    })
}

/// Parse `#[params(identity = "...")]` on the struct.
fn struct_identity(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut identity = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("params")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("identity") {
                identity = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `identity = \"...\"`"))
            }
        })?;
    }
    Ok(identity)
}

/// Parse `#[param]` / `#[param(label = "...")]` on a field.
///
/// Returns `None` for unmarked fields and `Some(label)` for marked ones.
fn param_attr(attrs: &[Attribute]) -> syn::Result<Option<Option<LitStr>>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("param")) else {
        return Ok(None);
    };
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(Some(None));
    }
    let mut label = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("label") {
            label = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("expected `label = \"...\"`"))
        }
    })?;
    Ok(Some(label))
}

fn kind_tokens(field: &ParamField<'_>) -> proc_macro2::TokenStream {
    match field.kind {
        Kind::Float => quote! { ::type_picker::FieldKind::Float },
        Kind::Int => quote! { ::type_picker::FieldKind::Int },
        Kind::Bool => quote! { ::type_picker::FieldKind::Bool },
        Kind::Text => quote! { ::type_picker::FieldKind::Text },
        Kind::Unsupported => {
            let ty = field.ty;
            quote! { ::type_picker::FieldKind::Unsupported(::core::any::type_name::<#ty>()) }
        }
    }
}

/// Infer the value kind from a type by matching the last path segment.
fn infer_field_kind(ty: &Type) -> Kind {
    match extract_last_segment(ty).as_str() {
        "f32" => Kind::Float,
        "i32" => Kind::Int,
        "bool" => Kind::Bool,
        "String" => Kind::Text,
        _ => Kind::Unsupported,
    }
}

/// Extract the last segment name from a type path (e.g. `std::string::String` → `"String"`).
///
/// Segments with generic arguments never match a supported kind.
fn extract_last_segment(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => match type_path.path.segments.last() {
            Some(segment) if segment.arguments.is_none() => segment.ident.to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}
