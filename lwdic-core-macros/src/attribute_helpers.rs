use proc_macro_error::abort;
use syn::punctuated::Punctuated;
use syn::{Attribute, GenericArgument, LitBool, LitStr, Path, PathArguments, Token, Type};

/// `#[bean(...)]` 中的选项
pub(crate) struct BeanOptions {
    /// `injectable = false` 时不注册
    pub injectable: bool,
    /// 替代 `Default::default()` 的构造函数名
    pub constructor: Option<syn::Ident>,
}

/// 解析 `#[bean(injectable = false, constructor = "try_new")]`
pub(crate) fn get_bean_options(attrs: &[Attribute]) -> BeanOptions {
    let mut options = BeanOptions {
        injectable: true,
        constructor: None,
    };

    for attr in attrs {
        if !attr.path().is_ident("bean") {
            continue;
        }
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("injectable") {
                let value: LitBool = meta.value()?.parse()?;
                options.injectable = value.value;
                Ok(())
            } else if meta.path.is_ident("constructor") {
                let value: LitStr = meta.value()?.parse()?;
                options.constructor = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `injectable` or `constructor`"))
            }
        });
        if let Err(e) = result {
            abort!(e.span(), "invalid #[bean] attribute: {}", e);
        }
    }
    options
}

/// 从 `#[named("...")]` 中提取名称
pub(crate) fn get_named(attrs: &[Attribute]) -> Option<String> {
    for attr in attrs {
        if attr.path().is_ident("named") {
            match attr.parse_args::<LitStr>() {
                Ok(name_lit) => return Some(name_lit.value()),
                Err(e) => abort!(
                    e.span(), "#[named] expects a string literal";
                    help = "write #[named(\"beanName\")]"
                ),
            }
        }
    }
    None
}

/// 是否带有 `#[inject]`
pub(crate) fn has_inject(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("inject"))
}

/// 从 `#[implements(A, B)]` 中提取 trait 路径，可出现多次
pub(crate) fn get_implements(attrs: &[Attribute]) -> Vec<Path> {
    let mut traits = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("implements") {
            match attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated) {
                Ok(paths) => traits.extend(paths),
                Err(e) => abort!(e.span(), "#[implements] expects a list of trait paths"),
            }
        }
    }
    traits
}

/// 从 `#[extends(T)]` 中提取父类型，只允许一个
pub(crate) fn get_extends(attrs: &[Attribute]) -> Option<Path> {
    let mut found: Option<Path> = None;
    for attr in attrs {
        if attr.path().is_ident("extends") {
            if found.is_some() {
                abort!(attr, "#[extends] may only name one direct supertype");
            }
            match attr.parse_args::<Path>() {
                Ok(path) => found = Some(path),
                Err(e) => abort!(e.span(), "#[extends] expects a single trait path"),
            }
        }
    }
    found
}

/// 提取 `Inject<T>` 中的 `T`
pub(crate) fn extract_inject_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Inject" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner_ty)) = args.args.first() {
                        return Some(inner_ty);
                    }
                }
            }
        }
    }
    None
}
