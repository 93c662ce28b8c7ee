use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attribute_helpers::{
    extract_inject_type, get_bean_options, get_extends, get_implements, get_named, has_inject,
};

/// 一个注入点
struct InjectionPoint<'a> {
    ident: &'a syn::Ident,
    target: &'a syn::Type,
    by_type: bool,
    explicit_name: Option<String>,
}

pub(crate) fn derive_bean_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics, "#[derive(Bean)] does not support generic types";
            help = "register a concrete instance with Container::add_instance instead"
        );
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => abort!(name, "#[derive(Bean)] requires named fields"),
        },
        _ => abort!(name, "#[derive(Bean)] can only be used on structs"),
    };

    let options = get_bean_options(&input.attrs);
    let alias = get_named(&input.attrs);
    let interfaces = get_implements(&input.attrs);
    let superclass = get_extends(&input.attrs);

    let points: Vec<InjectionPoint> = fields
        .iter()
        .filter_map(|field| {
            let by_type = has_inject(&field.attrs);
            let explicit_name = get_named(&field.attrs);
            if !by_type && explicit_name.is_none() {
                return None;
            }
            let ident = field.ident.as_ref()?;
            let target = match extract_inject_type(&field.ty) {
                Some(target) => target,
                None => abort!(
                    field.ty, "injected field `{}` must have type Inject<T>", ident;
                    help = "wrap the dependency: `{}: Inject<...>`", ident
                ),
            };
            Some(InjectionPoint {
                ident,
                target,
                by_type,
                explicit_name,
            })
        })
        .collect();

    // 元数据
    let alias_code = alias.map(|alias| quote! { .with_alias(#alias) });
    let interface_code = interfaces.iter().map(|path| {
        quote! { .with_interface(::std::any::type_name::<dyn #path>()) }
    });
    let superclass_code = superclass.as_ref().map(|path| {
        quote! { .with_superclass(::std::any::type_name::<dyn #path>()) }
    });
    let injectable = options.injectable;

    let field_descriptors: Vec<_> = points
        .iter()
        .map(|point| {
            let field_name = point.ident.to_string();
            let target = point.target;
            let by_type = point.by_type.then(|| quote! { .by_type() });
            let named = point
                .explicit_name
                .as_ref()
                .map(|explicit| quote! { .named(#explicit) });
            quote! {
                ::lwdic_core::scanner::FieldDescriptor::new(
                    #field_name,
                    ::std::any::type_name::<#target>(),
                )
                #by_type
                #named
            }
        })
        .collect();

    // 注入分派
    let inject_arms = points.iter().map(|point| {
        let ident = point.ident;
        let field_name = ident.to_string();
        let target = point.target;
        quote! {
            #field_name => self.#ident.set(field, registry.resolve::<#target>(resolution)?),
        }
    });

    // 构造
    let create_instance = match &options.constructor {
        Some(constructor) => quote! { #name::#constructor()? },
        None => quote! { <#name as ::std::default::Default>::default() },
    };
    let view_code = interfaces.iter().chain(superclass.iter()).map(|path| {
        quote! {
            .with_view::<dyn #path>(::std::sync::Arc::clone(&bean) as ::std::sync::Arc<dyn #path>)
        }
    });
    let construct_fn = if injectable {
        quote! {
            fn __lwdic_construct() -> ::lwdic_core::anyhow::Result<::lwdic_core::BeanInstance> {
                let bean = ::std::sync::Arc::new(#create_instance);
                ::std::result::Result::Ok(
                    ::lwdic_core::BeanInstance::from_arc(::std::sync::Arc::clone(&bean))
                        #(#view_code)*
                        .with_injectable(bean as ::std::sync::Arc<dyn ::lwdic_core::Injectable>),
                )
            }
        }
    } else {
        quote! {}
    };
    let construct_entry = if injectable {
        quote! { ::std::option::Option::Some(__lwdic_construct) }
    } else {
        quote! { ::std::option::Option::None }
    };

    let expanded = quote! {
        impl ::lwdic_core::Injectable for #name {
            fn injection_points(&self) -> ::std::vec::Vec<::lwdic_core::scanner::FieldDescriptor> {
                ::std::vec![#(#field_descriptors),*]
            }

            #[allow(unused_variables)]
            fn inject(
                &self,
                field: &str,
                resolution: ::lwdic_core::Resolution<'_>,
                registry: &::lwdic_core::BeanRegistry,
            ) -> ::lwdic_core::ContainerResult<()> {
                match field {
                    #(#inject_arms)*
                    _ => ::std::result::Result::Err(::lwdic_core::ContainerError::UnknownInjectionPoint {
                        bean: ::std::any::type_name::<Self>().to_string(),
                        field: field.to_string(),
                    }),
                }
            }
        }

        #[doc(hidden)]
        const _: () = {
            fn __lwdic_describe() -> ::lwdic_core::scanner::CandidateType {
                ::lwdic_core::scanner::CandidateType::new(::std::any::type_name::<#name>())
                    .with_injectable(#injectable)
                    #alias_code
                    #(#interface_code)*
                    #superclass_code
                    #(.with_field(#field_descriptors))*
            }

            #construct_fn

            ::lwdic_core::inventory::submit! {
                ::lwdic_core::scanner::BeanManifest {
                    module_path: ::std::module_path!(),
                    describe: __lwdic_describe,
                    construct: #construct_entry,
                }
            }
        };
    };

    TokenStream::from(expanded)
}
