//! `#[derive(Parameters)]` for ssmconfig.
//!
//! Every named field carrying `#[ssm("name")]` or `#[ssm("name,optional")]`
//! becomes one entry of the generated `ssmconfig::Schema`. Field types must
//! implement `From<String>`; anything else fails to compile at the field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input};

const ATTRIBUTE: &str = "ssm";

#[proc_macro_derive(Parameters, attributes(ssm))]
pub fn derive_parameters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(impl_schema(&input, Vec::new())),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Parameters can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Parameters can only be derived for structs",
            ));
        }
    };

    let mut registrations = Vec::new();
    for field in fields {
        if let Some(tag) = field_tag(field)? {
            registrations.push(register_field(field, &tag)?);
        }
    }

    Ok(impl_schema(&input, registrations))
}

/// Reads the single `#[ssm("...")]` attribute of a field, if any.
fn field_tag(field: &Field) -> syn::Result<Option<LitStr>> {
    let mut tag: Option<LitStr> = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        if tag.is_some() {
            return Err(syn::Error::new(attr.span(), "duplicate #[ssm] attribute"));
        }
        let literal = attr.parse_args::<LitStr>().map_err(|err| {
            syn::Error::new(
                err.span(),
                r#"expected #[ssm("name")] or #[ssm("name,optional")]"#,
            )
        })?;
        tag = Some(literal);
    }
    Ok(tag)
}

fn register_field(field: &Field, tag: &LitStr) -> syn::Result<TokenStream2> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new(field.span(), "#[ssm] requires a named field"));
    };
    let ty = &field.ty;
    let field_name = ident.to_string();

    let assign = quote_spanned! {ty.span()=>
        target.#ident = <#ty as ::core::convert::From<::std::string::String>>::from(
            ::std::string::String::from(value),
        );
    };

    Ok(quote! {
        .field(#field_name, #tag, |target: &mut Self, value: &str| {
            #assign
        })
    })
}

fn impl_schema(input: &DeriveInput, registrations: Vec<TokenStream2>) -> TokenStream2 {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::ssmconfig::Parameters for #ident #ty_generics #where_clause {
            fn schema() -> ::ssmconfig::Schema<Self> {
                ::ssmconfig::Schema::new()
                    #(#registrations)*
            }
        }
    }
}
