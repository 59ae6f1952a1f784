//! `#[listeners]` and its `#[listener(...)]` markers.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Meta, Path, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

const PRIORITIES: [&str; 7] = ["Top", "Lowest", "Low", "Normal", "High", "Highest", "Final"];

/// Arguments of one `#[listener(...)]` marker.
struct ListenerArgs {
    priority: Ident,
    subtypes: bool,
}

impl Default for ListenerArgs {
    fn default() -> Self {
        Self {
            priority: Ident::new("Normal", proc_macro2::Span::call_site()),
            subtypes: false,
        }
    }
}

impl Parse for ListenerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ListenerArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "priority" => {
                    input.parse::<Token![=]>()?;
                    let path: Path = input.parse()?;
                    args.priority = priority_variant(&path)?;
                }
                "subtypes" => args.subtypes = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown listener option: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// Resolves `High`, `high` or `Priority::High` to the variant identifier.
fn priority_variant(path: &Path) -> syn::Result<Ident> {
    let Some(last) = path.segments.last() else {
        return Err(syn::Error::new_spanned(path, "expected a priority"));
    };
    let written = last.ident.to_string();
    PRIORITIES
        .iter()
        .find(|p| p.eq_ignore_ascii_case(&written))
        .map(|p| Ident::new(p, last.ident.span()))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                path,
                format!(
                    "unknown priority `{}`, expected one of: {}",
                    written,
                    PRIORITIES.join(", ")
                ),
            )
        })
}

/// Removes the `#[listener]` marker from `method` and returns its arguments.
fn take_marker(method: &mut ImplItemFn) -> syn::Result<Option<ListenerArgs>> {
    let Some(position) = method
        .attrs
        .iter()
        .position(|a| a.path().is_ident("listener"))
    else {
        return Ok(None);
    };
    let attr = method.attrs.remove(position);
    if method.attrs.iter().any(|a| a.path().is_ident("listener")) {
        return Err(syn::Error::new_spanned(
            &method.sig.ident,
            "a function can only carry one `#[listener]`",
        ));
    }

    match &attr.meta {
        Meta::Path(_) => Ok(Some(ListenerArgs::default())),
        Meta::List(_) => attr.parse_args::<ListenerArgs>().map(Some),
        Meta::NameValue(_) => Err(syn::Error::new_spanned(
            &attr,
            "expected `#[listener]` or `#[listener(...)]`",
        )),
    }
}

/// One validated listener function.
struct Declared {
    name: Ident,
    event: Type,
    has_receiver: bool,
    args: ListenerArgs,
}

fn validate(method: &ImplItemFn, args: ListenerArgs) -> syn::Result<Declared> {
    let sig = &method.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "listener functions must not be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "listener functions must not be generic",
        ));
    }

    let mut has_receiver = false;
    let mut events = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                if receiver.reference.is_none() || receiver.mutability.is_some() {
                    return Err(syn::Error::new_spanned(
                        receiver,
                        "listener methods must take `&self`",
                    ));
                }
                has_receiver = true;
            }
            FnArg::Typed(pat_type) => events.push(&pat_type.ty),
        }
    }

    let [event] = events.as_slice() else {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "listener functions take exactly one event argument: `&E` or `&mut E`",
        ));
    };
    let Type::Reference(reference) = &***event else {
        return Err(syn::Error::new_spanned(
            event,
            "the event argument must be a reference: `&E` or `&mut E`",
        ));
    };

    Ok(Declared {
        name: sig.ident.clone(),
        event: (*reference.elem).clone(),
        has_receiver,
        args,
    })
}

fn subscription(declared: &Declared) -> TokenStream2 {
    let Declared {
        name,
        event,
        has_receiver,
        args,
    } = declared;
    let priority = &args.priority;
    let subtypes = args.subtypes;

    if *has_receiver {
        quote! {
            {
                let this = ::std::sync::Arc::clone(&self);
                ::ripple::Subscription::typed(
                    move |event: &mut #event| this.#name(event),
                    ::ripple::Priority::#priority,
                    #subtypes,
                )
            }
        }
    } else {
        quote! {
            ::ripple::Subscription::typed(
                |event: &mut #event| Self::#name(event),
                ::ripple::Priority::#priority,
                #subtypes,
            )
        }
    }
}

/// Implementation of the `#[listeners]` attribute macro.
pub fn listeners_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "`#[listeners]` takes no arguments")
            .to_compile_error()
            .into();
    }
    let mut input = parse_macro_input!(item as ItemImpl);
    expand(&mut input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "`#[listeners]` goes on an inherent impl block",
        ));
    }

    let mut declared = Vec::new();
    let mut errors = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let result = match take_marker(method) {
            Ok(Some(args)) => validate(method, args).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        };
        match result {
            Ok(Some(listener)) => declared.push(listener),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }
    let combined = errors.into_iter().reduce(|mut all, err| {
        all.combine(err);
        all
    });
    if let Some(errors) = combined {
        return Err(errors);
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let (methods, functions): (Vec<_>, Vec<_>) =
        declared.iter().partition(|d| d.has_receiver);

    let subscriber_impl = (!methods.is_empty()).then(|| {
        let subscriptions = methods.iter().map(|d| subscription(d));
        quote! {
            impl #impl_generics ::ripple::Subscriber for #self_ty #where_clause {
                fn subscriptions(
                    self: ::std::sync::Arc<Self>,
                ) -> ::core::result::Result<
                    ::std::vec::Vec<::ripple::Subscription>,
                    ::ripple::ListenerError,
                > {
                    ::core::result::Result::Ok(::std::vec![#(#subscriptions),*])
                }
            }
        }
    });

    let static_impl = (!functions.is_empty()).then(|| {
        let subscriptions = functions.iter().map(|d| subscription(d));
        quote! {
            impl #impl_generics ::ripple::StaticSubscriber for #self_ty #where_clause {
                fn static_subscriptions() -> ::core::result::Result<
                    ::std::vec::Vec<::ripple::Subscription>,
                    ::ripple::ListenerError,
                > {
                    ::core::result::Result::Ok(::std::vec![#(#subscriptions),*])
                }
            }
        }
    });

    Ok(quote! {
        #input
        #subscriber_impl
        #static_impl
    })
}
