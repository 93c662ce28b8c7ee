mod attribute_helpers;
mod bean_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Bean派生宏
///
/// 生成 `Injectable` 实现和编译期清单条目，使类型能被 `Container::scan_package` 发现。
///
/// 用法：
/// ```ignore
/// #[derive(Bean, Default)]
/// #[named("userService")]              // 可选：以别名代替类型名作为主 key
/// #[implements(UserApi, Auditable)]    // 可选：直接实现的接口（需为 Send + Sync 的 trait）
/// #[extends(BaseService)]              // 可选：直接父类型
/// #[bean(constructor = "try_new")]     // 可选：使用 fn try_new() -> Result<Self> 构造
/// #[bean(injectable = false)]          // 可选：扫描时跳过
/// pub struct UserService {
///     #[inject]
///     repo: Inject<dyn UserRepository>,   // 按类型注入
///
///     #[inject]
///     #[named("maxUsers")]
///     limit: Inject<u32>,                 // 按名称注入，名称优先于类型
///
///     counter: AtomicUsize,               // 普通字段，不参与注入
/// }
/// ```
#[proc_macro_derive(Bean, attributes(bean, named, inject, implements, extends))]
#[proc_macro_error]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    bean_impl::derive_bean_impl(input)
}
