//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Type, parse_macro_input};

/// The fields marked with `#[event(...)]`.
#[derive(Default)]
struct Marked {
    parent: Option<(TokenStream2, Type)>,
    cancelled: Option<TokenStream2>,
}

impl Marked {
    fn collect(fields: &Fields) -> syn::Result<Self> {
        let mut marked = Marked::default();
        for (index, field) in fields.iter().enumerate() {
            let access = field_access(field, index);
            for attr in field.attrs.iter().filter(|a| a.path().is_ident("event")) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("parent") {
                        if marked.parent.is_some() {
                            return Err(meta.error("only one field can be the parent event"));
                        }
                        marked.parent = Some((access.clone(), field.ty.clone()));
                        Ok(())
                    } else if meta.path.is_ident("cancelled") {
                        if marked.cancelled.is_some() {
                            return Err(meta.error("only one field can hold the cancelled flag"));
                        }
                        marked.cancelled = Some(access.clone());
                        Ok(())
                    } else {
                        Err(meta.error("expected `parent` or `cancelled`"))
                    }
                })?;
            }
        }
        Ok(marked)
    }
}

fn field_access(field: &Field, index: usize) -> TokenStream2 {
    match &field.ident {
        Some(ident) => quote! { #ident },
        None => {
            let index = Index::from(index);
            quote! { #index }
        }
    }
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let marked = match &input.data {
        Data::Struct(data) => Marked::collect(&data.fields)?,
        Data::Enum(data) => {
            let tagged = data
                .variants
                .iter()
                .flat_map(|v| v.fields.iter())
                .flat_map(|f| f.attrs.iter())
                .find(|a| a.path().is_ident("event"));
            if let Some(attr) = tagged {
                return Err(syn::Error::new_spanned(
                    attr,
                    "`#[event(...)]` is only supported on struct fields",
                ));
            }
            Marked::default()
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "`Event` cannot be derived for unions",
            ));
        }
    };

    let ancestry = marked.parent.as_ref().map(|(field, parent)| {
        quote! {
            fn parent_type() -> ::core::option::Option<::ripple::EventType>
            where
                Self: Sized,
            {
                ::core::option::Option::Some(::ripple::EventType::of::<#parent>())
            }

            fn as_ancestor(
                &self,
                ty: ::ripple::EventType,
            ) -> ::core::option::Option<&dyn ::core::any::Any> {
                if ty == ::ripple::EventType::of::<#parent>() {
                    ::core::option::Option::Some(&self.#field as &dyn ::core::any::Any)
                } else {
                    ::ripple::Event::as_ancestor(&self.#field, ty)
                }
            }

            fn as_ancestor_mut(
                &mut self,
                ty: ::ripple::EventType,
            ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                if ty == ::ripple::EventType::of::<#parent>() {
                    ::core::option::Option::Some(&mut self.#field as &mut dyn ::core::any::Any)
                } else {
                    ::ripple::Event::as_ancestor_mut(&mut self.#field, ty)
                }
            }
        }
    });

    // A sub-event with its own flag shares the parent's cancellation state.
    let (inherited_read, inherited_write) = match &marked.parent {
        Some((field, _)) => (
            quote! {
                || ::ripple::Event::as_cancellable(&self.#field)
                    .is_some_and(|parent| ::ripple::Cancellable::is_cancelled(parent))
            },
            quote! {
                if let ::core::option::Option::Some(parent) =
                    ::ripple::Event::as_cancellable_mut(&mut self.#field)
                {
                    ::ripple::Cancellable::set_cancelled(parent, cancelled);
                }
            },
        ),
        None => (TokenStream2::new(), TokenStream2::new()),
    };

    let (cancellation, cancellable_impl) = match (&marked.cancelled, &marked.parent) {
        (Some(flag), _) => (
            Some(quote! {
                fn as_cancellable(&self) -> ::core::option::Option<&dyn ::ripple::Cancellable> {
                    ::core::option::Option::Some(self)
                }

                fn as_cancellable_mut(
                    &mut self,
                ) -> ::core::option::Option<&mut dyn ::ripple::Cancellable> {
                    ::core::option::Option::Some(self)
                }
            }),
            Some(quote! {
                impl #impl_generics ::ripple::Cancellable for #name #ty_generics #where_clause {
                    fn is_cancelled(&self) -> bool {
                        self.#flag #inherited_read
                    }

                    fn set_cancelled(&mut self, cancelled: bool) {
                        self.#flag = cancelled;
                        #inherited_write
                    }
                }
            }),
        ),
        (None, Some((field, _))) => (
            Some(quote! {
                fn as_cancellable(&self) -> ::core::option::Option<&dyn ::ripple::Cancellable> {
                    ::ripple::Event::as_cancellable(&self.#field)
                }

                fn as_cancellable_mut(
                    &mut self,
                ) -> ::core::option::Option<&mut dyn ::ripple::Cancellable> {
                    ::ripple::Event::as_cancellable_mut(&mut self.#field)
                }
            }),
            None,
        ),
        (None, None) => (None, None),
    };

    Ok(quote! {
        impl #impl_generics ::ripple::Event for #name #ty_generics #where_clause {
            #ancestry
            #cancellation
        }

        #cancellable_impl
    })
}
