//! FromRow derive macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{column_name, field_attrs, named_fields};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_extracts: Vec<TokenStream> = named_fields(&input, "FromRow")?
        .iter()
        .map(|field| {
            let attrs = field_attrs(field)?;
            let ident = field.ident.as_ref().unwrap();
            if attrs.skip {
                return Ok(quote! { #ident: Default::default() });
            }
            let column = column_name(field, &attrs);
            Ok(quote! { #ident: row.try_get(#column)? })
        })
        .collect::<Result<_>>()?;

    Ok(quote! {
        impl #impl_generics loam::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &loam::Row) -> loam::OrmResult<Self> {
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
