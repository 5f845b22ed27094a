//! Attribute parsing for the Queryable derive macros.
//!
//! This module provides parsers for the `#[query(...)]` attributes used on
//! struct fields by `Queryable` and on enum variants by `QueryEnum`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, GenericArgument, Ident, Lit, Meta, PathArguments, Result, Token, Type,
};

/// The type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// String field: `#[query(String)]`
    String,
    /// Numeric field with the kind inferred from the Rust type: `#[query(Number)]`
    Number,
    /// Signed integer field: `#[query(Integer)]`
    Integer,
    /// Unsigned integer field: `#[query(Unsigned)]`
    Unsigned,
    /// Floating point field: `#[query(Float)]`
    Float,
    /// Timestamp field: `#[query(Timestamp)]`
    Timestamp,
    /// Enum field: `#[query(Enum)]`
    Enum,
    /// Boolean field: `#[query(Bool)]`
    Bool,
}

const EXPECTED_KINDS: &str = "String, Number, Integer, Unsigned, Float, Timestamp, Enum, Bool";

impl QueryKind {
    /// Parse a query kind from its name.
    pub fn parse(s: &str, span: Span) -> Result<Self> {
        match s {
            "String" | "string" => Ok(QueryKind::String),
            "Number" | "number" => Ok(QueryKind::Number),
            "Integer" | "integer" => Ok(QueryKind::Integer),
            "Unsigned" | "unsigned" => Ok(QueryKind::Unsigned),
            "Float" | "float" => Ok(QueryKind::Float),
            "Timestamp" | "timestamp" => Ok(QueryKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(QueryKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(QueryKind::Bool),
            other => Err(Error::new(
                span,
                format!("unknown query type: '{other}'. Expected one of: {EXPECTED_KINDS}"),
            )),
        }
    }

    /// Resolves `Number` to a concrete kind from the field's Rust type.
    pub fn resolve(self, ty: &Type) -> Result<Self> {
        if self != QueryKind::Number {
            return Ok(self);
        }
        let name = last_segment(ty).map(|ident| ident.to_string());
        match name.as_deref() {
            Some("i8" | "i16" | "i32" | "i64" | "isize") => Ok(QueryKind::Integer),
            Some("u8" | "u16" | "u32" | "u64" | "usize") => Ok(QueryKind::Unsigned),
            Some("f32" | "f64") => Ok(QueryKind::Float),
            _ => Err(Error::new(
                ty.span(),
                "cannot infer the numeric kind of this type. Use Integer, Unsigned, or Float",
            )),
        }
    }
}

/// Attributes from `#[query(...)]`.
#[derive(Debug, Clone)]
pub struct QueryAttr {
    /// The type of this queryable field.
    pub kind: Option<QueryKind>,
    /// The field is a nested `Queryable` record.
    pub nested: bool,
    /// Exclude this field from queries.
    pub skip: bool,
    /// This field is the primary key.
    pub key: bool,
    /// Custom field name for queries (default: field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for QueryAttr {
    fn default() -> Self {
        QueryAttr {
            kind: None,
            nested: false,
            skip: false,
            key: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // Flags and type identifiers: query(String), query(skip), ...
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if p.is_ident("nested") {
                        attr.nested = true;
                    } else if p.is_ident("key") {
                        attr.key = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(QueryKind::parse(&ident.to_string(), ident.span())?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected query type ({EXPECTED_KINDS}), nested, key, or skip"),
                        ));
                    }
                }

                // rename = "custom_name" or ty = "enum"
                Meta::NameValue(nv) => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(
                            nv.value.span(),
                            "attribute value must be a string literal",
                        ));
                    };

                    if nv.path.is_ident("rename") {
                        attr.rename = Some(s.value());
                    } else if nv.path.is_ident("ty") {
                        attr.kind = Some(QueryKind::parse(&s.value(), s.span())?);
                        attr.span = s.span();
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected a type, nested, key, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        if attr.nested && attr.kind.is_some() {
            return Err(Error::new(
                attr.span,
                "a nested field takes its types from the nested record; remove the type",
            ));
        }

        Ok(attr)
    }
}

/// Extract `#[query(...)]` attributes from a field's or variant's attributes.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<QueryAttr>();
        }
    }
    Ok(QueryAttr::default())
}

/// Returns `T` if `ty` is `Option<T>`.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn last_segment(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
        _ => None,
    }
}
