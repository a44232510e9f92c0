extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_quote, spanned::Spanned};

#[proc_macro_derive(Decode, attributes(codec))]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_decode(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Mirrors the tag-resolution rules of `#[derive(Encode)]`, which must agree
/// on every variant for the pair to be mutually inverse.
fn variant_tag(variant: &syn::Variant, position: usize) -> syn::Result<u8> {
    let mut tag: Option<u8> = None;
    for attr in variant.attrs.iter().filter(|a| a.path().is_ident("codec")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let lit: syn::LitInt = meta.value()?.parse()?;
                tag = Some(lit.base10_parse::<u8>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported codec attribute (expected `tag = N`)"))
            }
        })?;
    }
    match tag {
        Some(tag) => Ok(tag),
        None => u8::try_from(position)
            .map_err(|_| syn::Error::new(variant.span(), "enum has more than 256 variants")),
    }
}

fn decode_fields(
    path: TokenStream2,
    fields: &syn::Fields,
    decode_trait: &TokenStream2,
) -> TokenStream2 {
    match fields {
        syn::Fields::Unit => quote! { #path },
        syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
            let ty = unnamed.iter().map(|x| &x.ty);
            quote! { #path( #( <#ty as #decode_trait>::parse(p)? ),* ) }
        }
        syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
            let (fname, ty): (Vec<_>, Vec<_>) = named
                .iter()
                .filter_map(|x| x.ident.as_ref().map(|id| (id, &x.ty)))
                .unzip();
            quote! { #path { #( #fname: <#ty as #decode_trait>::parse(p)? ),* } }
        }
    }
}

fn impl_decode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let decode_trait = quote! { ::ledger_model::conv::Decode };
    let parser_trait = quote! { ::ledger_model::parse::Parser };
    let parse_result_type = quote! { ::ledger_model::parse::ParseResult };
    let tag_error_type = quote! { ::ledger_model::parse::error::TagError };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#decode_trait));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &ast.data {
        syn::Data::Union(_) => {
            return Err(syn::Error::new(
                ast.span(),
                "Derive macro `Decode` not implemented for unions",
            ))
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => {
            let value = decode_fields(quote! { Self }, fields, &decode_trait);
            quote! { Ok(#value) }
        }
        syn::Data::Enum(data) => {
            let mut tags: Vec<u8> = Vec::with_capacity(data.variants.len());
            let mut arms = Vec::with_capacity(data.variants.len());
            for (ix, variant) in data.variants.iter().enumerate() {
                let tag = variant_tag(variant, ix)?;
                if tags.contains(&tag) {
                    return Err(syn::Error::new(
                        variant.span(),
                        format!("duplicate discriminant tag {tag}"),
                    ));
                }
                tags.push(tag);
                let vname = &variant.ident;
                let value = decode_fields(quote! { Self::#vname }, &variant.fields, &decode_trait);
                arms.push(quote! { #tag => Ok(#value), });
            }
            quote! {
                match #parser_trait::take_u8(p)? {
                    #( #arms )*
                    other => Err(#tag_error_type::with_type::<Self>(other, &[ #( #tags ),* ]).into()),
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
            fn parse<__Parser: #parser_trait>(p: &mut __Parser) -> #parse_result_type<Self> {
                #body
            }
        }
    })
}
