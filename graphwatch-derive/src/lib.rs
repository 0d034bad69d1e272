//! `#[derive(Record)]`: implements `graphwatch::Record` for a plain struct
//! and generates a per-struct field-accessor trait for `Tracked<T>`, so it
//! can be wrapped and participate in activation and dispatch.
//!
//! Field writes go through `set_<field>(&self, value: T)`, which replaces
//! the stored value, re-homes any tracked child the old/new value carried,
//! and raises a `Change` — the struct itself never needs `RefCell` or `Rc`
//! in its own definition.
//!
//! The accessors live on a macro-generated trait (`{Type}Fields`) rather
//! than an inherent `impl Tracked<T>` block: `Tracked<T>` is defined in
//! `graphwatch`, so an inherent impl or a foreign-trait impl for it from a
//! downstream crate would violate the orphan rule. A trait defined by this
//! very macro invocation is local to that crate, so implementing it for
//! `Tracked<T>` is allowed; the trait is in scope automatically since it's
//! emitted next to the struct it describes.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// `#[record(transparent)]` on a single-field struct: the wrapped record
/// re-exports its one field's children directly, rather than nesting them
/// one path segment deeper. Generalizes the source's special-cased
/// `BaseCollectionModel.root` handling to any single-field wrapper.
fn is_transparent(input: &DeriveInput) -> bool {
    input.attrs.iter().any(|attr| {
        if !attr.path().is_ident("record") {
            return false;
        }
        let mut found = false;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("transparent") {
                found = true;
            }
            Ok(())
        });
        found
    })
}

#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let transparent = is_transparent(&input);

    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(&input, "Record can only be derived for structs")
            .to_compile_error()
            .into();
    };
    let Fields::Named(fields) = &data.fields else {
        return syn::Error::new_spanned(&input, "Record requires named fields")
            .to_compile_error()
            .into();
    };

    // Private fields (leading underscore) are never exposed for activation
    // or mutation — see §4.B "private field skipping".
    let tracked_fields: Vec<_> = fields
        .named
        .iter()
        .filter(|f| {
            let ident = f.ident.as_ref().unwrap();
            !ident.to_string().starts_with('_')
        })
        .collect();

    if transparent && tracked_fields.len() != 1 {
        return syn::Error::new_spanned(
            &input,
            "#[record(transparent)] requires exactly one non-private field",
        )
        .to_compile_error()
        .into();
    }

    let type_name_str = name.to_string();
    let fields_trait = format_ident!("{}Fields", name);

    let children_pushes = tracked_fields.iter().map(|f| {
        let ident = f.ident.as_ref().unwrap();
        let ty = &f.ty;
        let key_str = ident.to_string();
        quote! {
            match ::graphwatch::value::Trackable::as_node(&self.#ident) {
                Some(node) => children.push((
                    ::graphwatch::value::Key::Name(#key_str.to_string()),
                    ::graphwatch::value::Source::Attr,
                    node,
                )),
                None => ::graphwatch::value::log_unsupported_child::<#ty>(),
            }
        }
    });

    let children_body = if transparent {
        let ident = tracked_fields[0].ident.as_ref().unwrap();
        let ty = &tracked_fields[0].ty;
        quote! {
            match ::graphwatch::value::Trackable::as_node(&self.#ident) {
                Some(node) => node.children(),
                None => {
                    ::graphwatch::value::log_unsupported_child::<#ty>();
                    Vec::new()
                }
            }
        }
    } else {
        quote! {
            let mut children = Vec::new();
            #(#children_pushes)*
            children
        }
    };

    let accessor_sigs = tracked_fields.iter().map(|f| {
        let ident = f.ident.as_ref().unwrap();
        let ty = &f.ty;
        let getter = ident;
        let setter = format_ident!("set_{}", ident);
        quote! {
            fn #getter(&self) -> #ty;
            fn #setter(&self, value: #ty);
        }
    });

    let accessor_impls = tracked_fields.iter().map(|f| {
        let ident = f.ident.as_ref().unwrap();
        let ty = &f.ty;
        let key_str = ident.to_string();
        let getter = ident;
        let setter = format_ident!("set_{}", ident);
        quote! {
            fn #getter(&self) -> #ty {
                ::graphwatch::record::Tracked::borrow(self).#ident.clone()
            }

            fn #setter(&self, value: #ty) {
                let old = {
                    let mut inner = ::graphwatch::record::Tracked::borrow_mut(self);
                    ::std::mem::replace(&mut inner.#ident, value)
                };
                if ::graphwatch::registry::is_tracked(::graphwatch::node::Node::id(self)) {
                    if let Some(old_node) = ::graphwatch::value::Trackable::as_node(&old) {
                        ::graphwatch::activate::deactivate(
                            &old_node,
                            ::graphwatch::value::Key::Name(#key_str.to_string()),
                            Some(::graphwatch::node::Node::id(self)),
                            ::graphwatch::value::Source::Attr,
                        );
                    }
                    let new_value = {
                        let inner = ::graphwatch::record::Tracked::borrow(self);
                        ::graphwatch::value::Trackable::to_value(&inner.#ident)
                    };
                    let new_node = {
                        let inner = ::graphwatch::record::Tracked::borrow(self);
                        ::graphwatch::value::Trackable::as_node(&inner.#ident)
                    };
                    if let Some(new_node) = new_node {
                        ::graphwatch::activate::activate(
                            &new_node,
                            ::graphwatch::value::Key::Name(#key_str.to_string()),
                            Some(::graphwatch::node::Node::id(self)),
                            ::graphwatch::value::Source::Attr,
                            &mut ::std::collections::HashSet::new(),
                        );
                    }
                    ::graphwatch::dispatch::invoke(::graphwatch::Change::new(
                        ::graphwatch::node::Node::id(self),
                        #key_str,
                        Some(::graphwatch::value::Trackable::to_value(&old)),
                        Some(new_value),
                        ::graphwatch::value::Source::Attr,
                    ));
                }
            }
        }
    });

    let expanded = quote! {
        impl ::graphwatch::record::Record for #name {
            fn record_type_name() -> &'static str {
                #type_name_str
            }

            fn record_children(&self) -> Vec<(::graphwatch::value::Key, ::graphwatch::value::Source, ::std::rc::Rc<dyn ::graphwatch::node::Node>)> {
                #children_body
            }
        }

        #[allow(non_camel_case_types)]
        pub trait #fields_trait {
            #(#accessor_sigs)*
        }

        impl #fields_trait for ::graphwatch::record::Tracked<#name> {
            #(#accessor_impls)*
        }
    };

    expanded.into()
}
