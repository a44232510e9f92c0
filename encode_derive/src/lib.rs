extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_quote, spanned::Spanned};

#[proc_macro_derive(Encode, attributes(codec))]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_encode(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Reads the wire tag of a variant from `#[codec(tag = N)]`, defaulting to
/// the position of the variant within the enum declaration.
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

fn variant_tags(data: &syn::DataEnum) -> syn::Result<Vec<u8>> {
    let mut tags = Vec::with_capacity(data.variants.len());
    for (ix, variant) in data.variants.iter().enumerate() {
        let tag = variant_tag(variant, ix)?;
        if tags.contains(&tag) {
            return Err(syn::Error::new(
                variant.span(),
                format!("duplicate discriminant tag {tag}"),
            ));
        }
        tags.push(tag);
    }
    Ok(tags)
}

fn impl_encode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let encode_trait = quote! { ::ledger_model::conv::Encode };
    let target_trait = quote! { ::ledger_model::conv::target::Target };
    let discriminant_trait = quote! { ::ledger_model::adt::Discriminant };
    let resolve_zero_fn = quote! { ::ledger_model::resolve_zero! };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#encode_trait));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let gen = match &ast.data {
        syn::Data::Union(_) => {
            return Err(syn::Error::new(
                ast.span(),
                "Derive macro `Encode` not implemented for unions",
            ))
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => {
            let body = match fields {
                syn::Fields::Unit => quote! { #resolve_zero_fn(buf) },
                syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                    let i = (0..unnamed.len()).map(syn::Index::from);
                    quote! { #( #encode_trait::write_to(&self.#i, buf) + )* #resolve_zero_fn(buf) }
                }
                syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                    let ident = named.iter().filter_map(|field| field.ident.as_ref());
                    quote! { #( #encode_trait::write_to(&self.#ident, buf) + )* #resolve_zero_fn(buf) }
                }
            };
            quote! {
                impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
                    fn write_to<__Target: #target_trait>(&self, buf: &mut __Target) -> usize {
                        #body
                    }
                }
            }
        }
        syn::Data::Enum(data) => {
            let tags = variant_tags(data)?;
            let mut write_arms = Vec::with_capacity(tags.len());
            let mut tag_arms = Vec::with_capacity(tags.len());
            let mut table = Vec::with_capacity(tags.len());

            for (variant, tag) in data.variants.iter().zip(tags.iter()) {
                let vname = &variant.ident;
                let label = vname.to_string();
                table.push(quote! { (#label, #tag) });
                match &variant.fields {
                    syn::Fields::Unit => {
                        write_arms.push(quote! {
                            Self::#vname => #target_trait::push_one(buf, #tag) + #resolve_zero_fn(buf)
                        });
                        tag_arms.push(quote! { Self::#vname => #tag });
                    }
                    syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                        let binding: Vec<_> = (0..unnamed.len())
                            .map(|i| format_ident!("__field{}", i))
                            .collect();
                        write_arms.push(quote! {
                            Self::#vname( #( #binding ),* ) => {
                                #target_trait::push_one(buf, #tag)
                                    #( + #encode_trait::write_to(#binding, buf) )*
                                    + #resolve_zero_fn(buf)
                            }
                        });
                        tag_arms.push(quote! { Self::#vname(..) => #tag });
                    }
                    syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                        let binding: Vec<_> =
                            named.iter().filter_map(|f| f.ident.as_ref()).collect();
                        write_arms.push(quote! {
                            Self::#vname { #( #binding ),* } => {
                                #target_trait::push_one(buf, #tag)
                                    #( + #encode_trait::write_to(#binding, buf) )*
                                    + #resolve_zero_fn(buf)
                            }
                        });
                        tag_arms.push(quote! { Self::#vname { .. } => #tag });
                    }
                }
            }

            // uninhabited enums still need exhaustive (empty) matches
            let (write_body, tag_body) = if tags.is_empty() {
                (quote! { match *self {} }, quote! { match *self {} })
            } else {
                (
                    quote! { match self { #( #write_arms ),* } },
                    quote! { match self { #( #tag_arms ),* } },
                )
            };

            quote! {
                impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
                    fn write_to<__Target: #target_trait>(&self, buf: &mut __Target) -> usize {
                        #write_body
                    }
                }

                impl #impl_generics #discriminant_trait for #name #ty_generics #where_clause {
                    const VARIANTS: &'static [(&'static str, u8)] = &[ #( #table ),* ];

                    fn discriminant(&self) -> u8 {
                        #tag_body
                    }
                }
            }
        }
    };
    Ok(gen)
}
