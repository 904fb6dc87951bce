//! `#[orm(...)]` attribute parsing shared by the derives.

use syn::{DeriveInput, Field, LitStr, Result};

/// Per-field options.
#[derive(Default)]
pub struct FieldAttrs {
    pub column: Option<String>,
    pub skip: bool,
    pub flatten: bool,
    pub base: bool,
}

pub fn field_attrs(field: &Field) -> Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                parsed.column = Some(lit.value());
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("flatten") {
                parsed.flatten = true;
            } else if meta.path.is_ident("base") {
                parsed.base = true;
            } else {
                return Err(meta.error("expected `column`, `skip`, `flatten`, or `base`"));
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

/// Column name for a field: explicit `column = "..."` or the field name.
pub fn column_name(field: &Field, attrs: &FieldAttrs) -> String {
    attrs
        .column
        .clone()
        .unwrap_or_else(|| field.ident.as_ref().unwrap().to_string())
}

/// Struct-level `#[orm(table = "...")]`, if present.
pub fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `table`"))
            }
        })?;
    }
    Ok(table)
}

/// Named struct fields, or an error in the derive's name.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<Field, syn::Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{} can only be derived for structs with named fields", derive),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{} can only be derived for structs", derive),
        )),
    }
}
