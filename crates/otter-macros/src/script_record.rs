//! `#[derive(ScriptRecord)]` implementation.

use std::collections::HashSet;

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Type};

/// Options from `#[script(...)]` on the struct itself.
struct ContainerArgs {
    name: Option<String>,
    object: bool,
    crate_path: Option<syn::Path>,
}

/// Parsed `#[script(...)]` on one field.
enum FieldMarker {
    Exposed { name: Option<String>, readonly: bool },
    Base,
}

/// A field that takes part in script access.
struct MarkedField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    marker: FieldMarker,
}

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ScriptRecord cannot be derived for generic types",
        ));
    }

    let container = parse_container_args(&input.attrs)?;
    let fields = named_fields(input)?;
    let marked = collect_marked_fields(fields)?;

    let ident = &input.ident;
    let type_name = container
        .name
        .clone()
        .unwrap_or_else(|| ident.to_string());
    let krate = container
        .crate_path
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::otter_host));

    let mut seen = HashSet::new();
    let mut accessor_fns = Vec::new();
    let mut descriptors = Vec::new();
    let mut base = quote! { ::std::option::Option::None };
    let mut has_base = false;

    for field in &marked {
        let field_ident = field.ident;
        let field_name = field_ident.to_string();
        let ty = field.ty;

        match &field.marker {
            FieldMarker::Base => {
                if has_base {
                    return Err(syn::Error::new_spanned(
                        field_ident,
                        "only one field can be marked #[script(base)]",
                    ));
                }
                has_base = true;
                accessor_fns.push(quote! {
                    fn __script_base(
                        this: &dyn ::std::any::Any,
                    ) -> ::std::option::Option<&dyn ::std::any::Any> {
                        this.downcast_ref::<#ident>()
                            .map(|this| &this.#field_ident as &dyn ::std::any::Any)
                    }

                    fn __script_base_mut(
                        this: &mut dyn ::std::any::Any,
                    ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                        this.downcast_mut::<#ident>()
                            .map(|this| &mut this.#field_ident as &mut dyn ::std::any::Any)
                    }
                });
                base = quote! {
                    ::std::option::Option::Some(#krate::record::BaseLink {
                        field: #field_name,
                        record_type: <#ty as #krate::record::ScriptRecord>::script_type,
                        project: __script_base,
                        project_mut: __script_base_mut,
                    })
                };
            }
            FieldMarker::Exposed { name, readonly } => {
                let exposed = name.clone().unwrap_or_else(|| field_name.clone());
                if !seen.insert(exposed.clone()) {
                    return Err(syn::Error::new_spanned(
                        field_ident,
                        format!("script property '{exposed}' is declared twice on {type_name}"),
                    ));
                }

                let read_fn = format_ident!("__script_read_{}", field_ident);
                let write_fn = format_ident!("__script_write_{}", field_ident);

                accessor_fns.push(quote! {
                    fn #read_fn(
                        this: &dyn ::std::any::Any,
                    ) -> #krate::error::AccessResult<::std::option::Option<#krate::value::Value>> {
                        let this = this
                            .downcast_ref::<#ident>()
                            .ok_or(#krate::error::AccessError::WrongReceiver(#type_name))?;
                        ::std::result::Result::Ok(
                            <#ty as #krate::record::FieldValue>::to_value(&this.#field_ident),
                        )
                    }
                });

                let write_body = if *readonly {
                    quote! {
                        let _ = (this, value);
                        ::std::result::Result::Err(#krate::error::AccessError::ReadOnly(#exposed))
                    }
                } else {
                    quote! {
                        let this = this
                            .downcast_mut::<#ident>()
                            .ok_or(#krate::error::AccessError::WrongReceiver(#type_name))?;
                        this.#field_ident = <#ty as #krate::record::FieldValue>::from_value(value)?;
                        ::std::result::Result::Ok(())
                    }
                };
                accessor_fns.push(quote! {
                    fn #write_fn(
                        this: &mut dyn ::std::any::Any,
                        value: ::std::option::Option<#krate::value::Value>,
                    ) -> #krate::error::AccessResult<()> {
                        #write_body
                    }
                });

                descriptors.push(quote! {
                    #krate::record::FieldDescriptor {
                        name: #exposed,
                        field: #field_name,
                        readonly: #readonly,
                        read: #read_fn,
                        write: #write_fn,
                    }
                });
            }
        }
    }

    let script_object_views = if container.object {
        quote! {
            fn as_script_object(&self) -> ::std::option::Option<&dyn #krate::object::ScriptObject> {
                ::std::option::Option::Some(self)
            }

            fn as_script_object_mut(
                &mut self,
            ) -> ::std::option::Option<&mut dyn #krate::object::ScriptObject> {
                ::std::option::Option::Some(self)
            }
        }
    } else {
        quote! {}
    };

    let script_object = container.object;

    Ok(quote! {
        impl #krate::record::ScriptRecord for #ident {
            fn script_type() -> &'static #krate::record::RecordType {
                static RECORD_TYPE: ::std::sync::LazyLock<#krate::record::RecordType> =
                    ::std::sync::LazyLock::new(|| {
                        #(#accessor_fns)*

                        #krate::record::RecordType {
                            name: #type_name,
                            fields: ::std::vec![#(#descriptors),*],
                            base: #base,
                            script_object: #script_object,
                        }
                    });
                &RECORD_TYPE
            }

            fn record_type(&self) -> &'static #krate::record::RecordType {
                <Self as #krate::record::ScriptRecord>::script_type()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            #script_object_views
        }
    })
}

fn named_fields(input: &DeriveInput) -> syn::Result<impl Iterator<Item = &Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter()),
            _ => Err(syn::Error::new_spanned(
                input,
                "ScriptRecord derive only supports structs with named fields",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            "ScriptRecord derive only supports structs",
        )),
    }
}

fn collect_marked_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
) -> syn::Result<Vec<MarkedField<'a>>> {
    let mut marked = Vec::new();
    for field in fields {
        let Some(marker) = parse_field_marker(&field.attrs)? else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        marked.push(MarkedField {
            ident,
            ty: &field.ty,
            marker,
        });
    }
    Ok(marked)
}

fn parse_container_args(attrs: &[Attribute]) -> syn::Result<ContainerArgs> {
    let mut args = ContainerArgs {
        name: None,
        object: false,
        crate_path: None,
    };

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("script")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let name: LitStr = meta.value()?.parse()?;
                args.name = Some(name.value());
                Ok(())
            } else if meta.path.is_ident("object") {
                args.object = true;
                Ok(())
            } else if meta.path.is_ident("crate_path") {
                let path: LitStr = meta.value()?.parse()?;
                args.crate_path = Some(path.parse()?);
                Ok(())
            } else {
                Err(meta.error(
                    "unknown option. Expected 'name', 'object' or 'crate_path'.",
                ))
            }
        })?;
    }

    Ok(args)
}

fn parse_field_marker(attrs: &[Attribute]) -> syn::Result<Option<FieldMarker>> {
    let mut marker = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("script")) {
        if marker.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "a field can carry only one #[script] marker",
            ));
        }

        // Bare #[script]
        if matches!(attr.meta, syn::Meta::Path(_)) {
            marker = Some(FieldMarker::Exposed {
                name: None,
                readonly: false,
            });
            continue;
        }

        let mut name = None;
        let mut readonly = false;
        let mut base = false;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(meta.error("script property name cannot be empty"));
                }
                name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("readonly") {
                readonly = true;
                Ok(())
            } else if meta.path.is_ident("base") {
                base = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unknown marker option. Expected 'name', 'readonly' or 'base'.",
                ))
            }
        })?;

        if base && (name.is_some() || readonly) {
            return Err(syn::Error::new_spanned(
                attr,
                "#[script(base)] cannot be combined with 'name' or 'readonly'",
            ));
        }

        marker = Some(if base {
            FieldMarker::Base
        } else {
            FieldMarker::Exposed { name, readonly }
        });
    }

    Ok(marker)
}
