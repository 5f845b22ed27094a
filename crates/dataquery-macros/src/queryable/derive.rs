//! Implementation of the `#[derive(Queryable)]` and `#[derive(QueryEnum)]`
//! macros.
//!
//! `Queryable` generates field name constants and a `Queryable::schema()`
//! that registers every annotated field with its accessor. `QueryEnum`
//! generates the member table of a fieldless enum.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Expr, Fields, Result};

use super::attrs::{option_inner, parse_query_attrs, QueryKind};

/// Main implementation of the Queryable derive macro.
pub fn queryable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let schema_name = struct_name.to_string();

    // Ensure we have a struct with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Queryable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Queryable can only be derived for structs",
            ))
        }
    };

    let mut registrations: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut primary_key: Option<String> = None;

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_query_attrs(&field.attrs)?;

        // Skip if marked with #[query(skip)] or not annotated at all
        if attrs.skip || (attrs.kind.is_none() && !attrs.nested) {
            continue;
        }

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));

        field_constants.push(quote! {
            /// Field name constant for type-safe queries.
            pub const #const_name: &'static str = #query_name;
        });

        if attrs.key {
            if primary_key.is_some() {
                return Err(Error::new(field.span(), "only one field can be the key"));
            }
            primary_key = Some(query_name.clone());
        }

        let (inner_ty, optional) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };

        if attrs.nested {
            registrations.push(if optional {
                quote! {
                    .nested_optional(
                        #query_name,
                        |record: &#struct_name| ::core::option::Option::as_ref(&record.#field_name),
                        <#inner_ty as ::dataquery::Queryable>::schema(),
                    )
                }
            } else {
                quote! {
                    .nested(
                        #query_name,
                        |record: &#struct_name| &record.#field_name,
                        <#inner_ty as ::dataquery::Queryable>::schema(),
                    )
                }
            });
            continue;
        }

        let kind = match attrs.kind {
            Some(kind) => kind.resolve(inner_ty)?,
            None => continue,
        };

        let kind_expr = match kind {
            QueryKind::String => quote! { ::dataquery::FieldKind::String },
            QueryKind::Integer | QueryKind::Number => quote! { ::dataquery::FieldKind::Integer },
            QueryKind::Unsigned => quote! { ::dataquery::FieldKind::Unsigned },
            QueryKind::Float => quote! { ::dataquery::FieldKind::Float },
            QueryKind::Timestamp => quote! { ::dataquery::FieldKind::Timestamp },
            QueryKind::Enum => quote! {
                ::dataquery::FieldKind::Enum(<#inner_ty as ::dataquery::QueryEnum>::VARIANTS)
            },
            QueryKind::Bool => quote! { ::dataquery::FieldKind::Bool },
        };

        let field_type = if optional {
            quote! { ::dataquery::FieldType::optional(#kind_expr) }
        } else {
            quote! { ::dataquery::FieldType::new(#kind_expr) }
        };

        let accessor = if optional {
            let value_expr = value_expr(kind, quote! { value });
            quote! {
                match &record.#field_name {
                    ::core::option::Option::Some(value) => #value_expr,
                    ::core::option::Option::None => ::dataquery::Value::None,
                }
            }
        } else {
            value_expr(kind, quote! { &record.#field_name })
        };

        registrations.push(quote! {
            .field(#query_name, #field_type, |record: &#struct_name| #accessor)
        });
    }

    let primary_key = primary_key.map(|name| quote! { .primary_key(#name) });

    let expanded = quote! {
        impl #struct_name {
            #(#field_constants)*
        }

        impl ::dataquery::Queryable for #struct_name {
            fn schema() -> ::dataquery::Schema<Self> {
                ::dataquery::Schema::builder(#schema_name)
                    #(#registrations)*
                    #primary_key
                    .build()
            }
        }
    };

    Ok(expanded)
}

/// Builds the `Value` for a field, given an expression borrowing it.
fn value_expr(kind: QueryKind, access: TokenStream) -> TokenStream {
    match kind {
        QueryKind::String => quote! {
            ::dataquery::Value::String(::core::convert::AsRef::<str>::as_ref(#access))
        },
        QueryKind::Number | QueryKind::Integer | QueryKind::Unsigned | QueryKind::Float => quote! {
            ::dataquery::Value::Number(::dataquery::Number::from(*#access))
        },
        QueryKind::Timestamp => quote! {
            ::dataquery::Value::Timestamp(::dataquery::QueryTimestamp::query_timestamp(#access))
        },
        QueryKind::Enum => quote! {
            ::dataquery::Value::Enum(::dataquery::QueryEnum::discriminant(#access))
        },
        QueryKind::Bool => quote! { ::dataquery::Value::Bool(*#access) },
    }
}

/// Main implementation of the QueryEnum derive macro.
///
/// Member names are the lower-cased variant name or rename, matching the
/// lower-cased filter grammar. Discriminants are the explicit ones when
/// given, otherwise one more than the previous variant's.
pub fn query_enum_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let enum_name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(Error::new(
                input.span(),
                "QueryEnum can only be derived for enums",
            ))
        }
    };

    let mut entries: Vec<TokenStream> = Vec::new();
    let mut arms: Vec<TokenStream> = Vec::new();
    let mut next: u32 = 0;

    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new(
                variant.span(),
                "QueryEnum can only be derived for enums without fields",
            ));
        }

        let discriminant = match &variant.discriminant {
            Some((_, expr)) => literal_u32(expr)?,
            None => next,
        };
        next = discriminant.wrapping_add(1);

        let attrs = parse_query_attrs(&variant.attrs)?;
        let name = attrs
            .rename
            .unwrap_or_else(|| variant.ident.to_string())
            .to_lowercase();
        let ident = &variant.ident;

        entries.push(quote! { (#name, #discriminant) });
        arms.push(quote! { #enum_name::#ident => #discriminant, });
    }

    Ok(quote! {
        impl ::dataquery::QueryEnum for #enum_name {
            const VARIANTS: &'static [(&'static str, u32)] = &[#(#entries),*];

            fn discriminant(&self) -> u32 {
                match self {
                    #(#arms)*
                }
            }
        }
    })
}

fn literal_u32(expr: &Expr) -> Result<u32> {
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(int),
            ..
        }) => int.base10_parse::<u32>(),
        _ => Err(Error::new(
            expr.span(),
            "QueryEnum discriminants must be integer literals",
        )),
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
