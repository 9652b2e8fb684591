//! `#[derive(Capture)]` for valuelog-core.
//!
//! The generated impl lives next to the type, so it sees private fields.
//! Generated paths go through `::valuelog_core`; use the macro through the
//! re-export in `valuelog_core` rather than depending on this crate directly.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, spanned::Spanned, Attribute, Data, DeriveInput, Error, Fields,
    GenericParam, Generics, Ident, LitStr,
};

#[proc_macro_derive(Capture, attributes(capture))]
pub fn derive_capture(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Options read from `#[capture(...)]` on a field or variant.
#[derive(Default)]
struct Options {
    skip: bool,
    rename: Option<String>,
}

impl Options {
    fn from_attrs(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut options = Options::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("capture")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let name: LitStr = meta.value()?.parse()?;
                    options.rename = Some(name.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(options)
    }
}

/// One field as seen by the generated code.
struct Member {
    /// Output key (record fields only).
    name: String,
    /// Pattern binding in enum arms.
    binding: Ident,
    /// Access path on `self` in struct impls.
    access: TokenStream2,
    skip: bool,
}

fn members(fields: &Fields) -> Result<Vec<Member>, Error> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let options = Options::from_attrs(&field.attrs)?;
            let (name, access) = match &field.ident {
                Some(ident) => (
                    options.rename.unwrap_or_else(|| ident.to_string()),
                    quote!(#ident),
                ),
                None => {
                    let index = syn::Index::from(index);
                    (index.index.to_string(), quote!(#index))
                }
            };
            Ok(Member {
                name,
                binding: format_ident!("__field{}", index),
                access,
                skip: options.skip,
            })
        })
        .collect()
}

fn expand(input: DeriveInput) -> Result<TokenStream2, Error> {
    let ident = &input.ident;
    let generics = add_capture_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let (body, extra) = match &input.data {
        Data::Struct(data) => expand_struct(&data.fields)?,
        Data::Enum(data) => {
            let mut arms = Vec::new();
            for variant in &data.variants {
                let options = Options::from_attrs(&variant.attrs)?;
                if options.skip {
                    return Err(Error::new(
                        variant.span(),
                        "#[capture(skip)] is not supported on enum variants",
                    ));
                }
                let name = options
                    .rename
                    .unwrap_or_else(|| variant.ident.to_string());
                arms.push(expand_variant(ident, &variant.ident, &name, &variant.fields)?);
            }
            let body = if arms.is_empty() {
                quote!({
                    let _ = w;
                    match *self {}
                })
            } else {
                quote!(match self { #(#arms)* })
            };
            (body, TokenStream2::new())
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span(),
                "#[derive(Capture)] does not support unions",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::valuelog_core::Capture for #ident #ty_generics #where_clause {
            fn capture(
                &self,
                w: &mut ::valuelog_core::Walker,
            ) -> ::valuelog_core::CaptureResult {
                #body
            }
            #extra
        }
    })
}

/// Returns the `capture` body plus any extra trait items.
fn expand_struct(fields: &Fields) -> Result<(TokenStream2, TokenStream2), Error> {
    let members = members(fields)?;
    match fields {
        Fields::Named(_) => {
            let calls = members.iter().filter(|m| !m.skip).map(|m| {
                let (name, access) = (&m.name, &m.access);
                quote!(record.field(#name, &self.#access);)
            });
            Ok((
                quote! {
                    let mut record = w.record();
                    #(#calls)*
                    record.finish()
                },
                TokenStream2::new(),
            ))
        }
        // newtypes are transparent
        Fields::Unnamed(_) if members.len() == 1 && !members[0].skip => Ok((
            quote!(::valuelog_core::Capture::capture(&self.0, w)),
            quote! {
                fn tracks_identity(&self) -> bool {
                    ::valuelog_core::Capture::tracks_identity(&self.0)
                }
            },
        )),
        Fields::Unnamed(_) => {
            let calls = members.iter().filter(|m| !m.skip).map(|m| {
                let access = &m.access;
                quote!(seq.element(&self.#access);)
            });
            Ok((
                quote! {
                    let mut seq = w.seq();
                    #(#calls)*
                    seq.finish()
                },
                TokenStream2::new(),
            ))
        }
        Fields::Unit => Ok((quote!(w.record().finish()), TokenStream2::new())),
    }
}

fn expand_variant(
    ty: &Ident,
    variant: &Ident,
    name: &str,
    fields: &Fields,
) -> Result<TokenStream2, Error> {
    let members = members(fields)?;
    let bind = |m: &Member| {
        if m.skip {
            quote!(_)
        } else {
            let binding = &m.binding;
            quote!(#binding)
        }
    };

    let arm = match fields {
        Fields::Unit => quote! {
            #ty::#variant => w.text(#name),
        },
        Fields::Unnamed(_) => {
            let patterns = members.iter().map(bind);
            let kept: Vec<&Member> = members.iter().filter(|m| !m.skip).collect();
            let payload = if members.len() == 1 && kept.len() == 1 {
                let binding = &kept[0].binding;
                quote!(::valuelog_core::Capture::capture(#binding, w))
            } else {
                let bindings = kept.iter().map(|m| &m.binding);
                quote! {
                    let mut seq = w.seq();
                    #(seq.element(#bindings);)*
                    seq.finish()
                }
            };
            quote! {
                #ty::#variant(#(#patterns),*) => {
                    let mut record = w.record();
                    record.field_with(#name, |w| { #payload });
                    record.finish()
                }
            }
        }
        Fields::Named(named) => {
            let patterns = named.named.iter().zip(&members).map(|(field, m)| {
                let ident = &field.ident;
                let pattern = bind(m);
                quote!(#ident: #pattern)
            });
            let calls = members.iter().filter(|m| !m.skip).map(|m| {
                let (key, binding) = (&m.name, &m.binding);
                quote!(inner.field(#key, #binding);)
            });
            quote! {
                #ty::#variant { #(#patterns),* } => {
                    let mut record = w.record();
                    record.field_with(#name, |w| {
                        let mut inner = w.record();
                        #(#calls)*
                        inner.finish()
                    });
                    record.finish()
                }
            }
        }
    };
    Ok(arm)
}

fn add_capture_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::valuelog_core::Capture));
        }
    }
    generics
}
