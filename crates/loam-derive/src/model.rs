//! Model and Embed derive implementations.
//!
//! Both generate a `FieldSet` impl: string-keyed get/set over the struct's
//! mapped columns, with `#[orm(flatten)]` fields contributing their own
//! bindings under the owner's namespace. Lookups try the owner's fields
//! first, then flattened embeds in declaration order, so the owner wins on
//! column collisions. `Model` additionally wires up the embedded base state
//! and the table name.

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{column_name, field_attrs, named_fields, table_name};

struct Mapped {
    ident: syn::Ident,
    column: String,
}

struct Flattened {
    ident: syn::Ident,
    ty: syn::Type,
}

struct Parsed {
    own: Vec<Mapped>,
    flattened: Vec<Flattened>,
    base: Option<syn::Ident>,
}

fn parse_fields(input: &DeriveInput, derive: &str) -> Result<Parsed> {
    let mut parsed = Parsed {
        own: Vec::new(),
        flattened: Vec::new(),
        base: None,
    };

    for field in named_fields(input, derive)? {
        let attrs = field_attrs(field)?;
        let ident = field.ident.clone().unwrap();

        if attrs.skip {
            continue;
        }
        if attrs.base {
            if parsed.base.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[orm(base)]",
                ));
            }
            parsed.base = Some(ident);
            continue;
        }
        if attrs.flatten {
            parsed.flattened.push(Flattened {
                ident,
                ty: field.ty.clone(),
            });
            continue;
        }
        parsed.own.push(Mapped {
            column: column_name(field, &attrs),
            ident,
        });
    }
    Ok(parsed)
}

fn field_set_impl(name: &syn::Ident, parsed: &Parsed, with_base: bool) -> TokenStream {
    let own_columns: Vec<&str> = parsed.own.iter().map(|f| f.column.as_str()).collect();
    let own_column_extend = if own_columns.is_empty() {
        quote! {}
    } else {
        quote! { columns.extend([#(#own_columns),*]); }
    };

    let flatten_columns = parsed.flattened.iter().map(|f| {
        let ty = &f.ty;
        quote! {
            columns.extend(<#ty as loam::FieldSet>::columns());
        }
    });

    let columns_head = if with_base {
        quote! { let mut columns = <loam::BaseModel as loam::FieldSet>::columns(); }
    } else {
        quote! { let mut columns: Vec<&'static str> = Vec::new(); }
    };

    let get_arms = parsed.own.iter().map(|f| {
        let column = &f.column;
        let ident = &f.ident;
        quote! {
            #column => return Some(loam::ToValue::to_value(&self.#ident)),
        }
    });

    let set_arms = parsed.own.iter().map(|f| {
        let column = &f.column;
        let ident = &f.ident;
        quote! {
            #column => {
                self.#ident = loam::FromValue::from_value(value)
                    .map_err(|m| loam::OrmError::decode(#column, m))?;
                return Ok(true);
            }
        }
    });

    let get_flatten = parsed.flattened.iter().map(|f| {
        let ident = &f.ident;
        quote! {
            if let Some(value) = loam::FieldSet::get_field(&self.#ident, column) {
                return Some(value);
            }
        }
    });

    let set_flatten = parsed.flattened.iter().map(|f| {
        let ident = &f.ident;
        quote! {
            if loam::FieldSet::set_field(&mut self.#ident, column, value.clone())? {
                return Ok(true);
            }
        }
    });

    let (get_tail, set_tail) = match (&parsed.base, with_base) {
        (Some(base), true) => (
            quote! { loam::FieldSet::get_field(&self.#base, column) },
            quote! { loam::FieldSet::set_field(&mut self.#base, column, value) },
        ),
        _ => (quote! { None }, quote! { Ok(false) }),
    };

    quote! {
        impl loam::FieldSet for #name {
            fn columns() -> Vec<&'static str> {
                #columns_head
                #own_column_extend
                #(#flatten_columns)*
                // Shadowed embed columns would repeat; first binding wins.
                let mut seen = std::collections::BTreeSet::new();
                columns.retain(|column| seen.insert(*column));
                columns
            }

            fn get_field(&self, column: &str) -> Option<loam::Value> {
                match column {
                    #(#get_arms)*
                    _ => {}
                }
                #(#get_flatten)*
                #get_tail
            }

            fn set_field(&mut self, column: &str, value: loam::Value) -> loam::OrmResult<bool> {
                match column {
                    #(#set_arms)*
                    _ => {}
                }
                #(#set_flatten)*
                #set_tail
            }
        }
    }
}

pub fn expand_model(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let parsed = parse_fields(&input, "Model")?;

    let Some(base) = parsed.base.clone() else {
        return Err(syn::Error::new_spanned(
            &input,
            "Model requires a field marked #[orm(base)] of type loam::BaseModel",
        ));
    };

    let table = match table_name(&input)? {
        Some(table) => table,
        // users, order_items, ...
        None => format!("{}s", name.to_string().to_snake_case()),
    };

    let field_set = field_set_impl(name, &parsed, true);

    Ok(quote! {
        #field_set

        impl loam::Model for #name {
            fn table() -> &'static str {
                #table
            }

            fn base(&self) -> &loam::BaseModel {
                &self.#base
            }

            fn base_mut(&mut self) -> &mut loam::BaseModel {
                &mut self.#base
            }
        }

        impl loam::FromRow for #name {
            fn from_row(row: &loam::Row) -> loam::OrmResult<Self> {
                <Self as loam::Model>::hydrate(row)
            }
        }
    })
}

pub fn expand_embed(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let parsed = parse_fields(&input, "Embed")?;

    if parsed.base.is_some() {
        return Err(syn::Error::new_spanned(
            &input,
            "#[orm(base)] belongs on Model structs, not embeds",
        ));
    }

    Ok(field_set_impl(name, &parsed, false))
}
