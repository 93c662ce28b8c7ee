use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::registry::BeanRegistry;
use crate::scanner::FieldDescriptor;
use crate::ContainerResult;

/// 容器持有的类型擦除后的 Bean 实例
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// 单个 Bean 实例及其可被查找的类型视图
///
/// 每个视图都是一个 `Arc<V>`（自身类型或某个 `dyn Trait`），与实例共享同一块内存。
/// "可赋值给 `T`" 的判定就是：是否存在类型为 `Arc<T>` 的视图。
pub struct BeanInstance {
    type_name: &'static str,
    instance: BeanRef,
    views: Vec<Box<dyn Any + Send + Sync>>,
    injectable: Option<Arc<dyn Injectable>>,
}

impl BeanInstance {
    /// 包装一个普通值（例如通过 `add_bean` 注册的 `i32`）
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// 包装一个已共享的实例，自动添加 `Arc<T>` 视图
    pub fn from_arc<T: Any + Send + Sync>(bean: Arc<T>) -> Self {
        let own_view: Box<dyn Any + Send + Sync> = Box::new(Arc::clone(&bean));
        Self {
            type_name: std::any::type_name::<T>(),
            instance: bean,
            views: vec![own_view],
            injectable: None,
        }
    }

    /// 添加一个额外的类型视图，通常是 `Arc<dyn Trait>`
    pub fn with_view<V>(mut self, view: Arc<V>) -> Self
    where
        V: ?Sized + Send + Sync + 'static,
    {
        self.views.push(Box::new(view));
        self
    }

    /// 声明该实例的注入点
    pub fn with_injectable(mut self, target: Arc<dyn Injectable>) -> Self {
        self.injectable = Some(target);
        self
    }

    /// 具体类型名
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 类型擦除后的实例
    pub fn instance(&self) -> &BeanRef {
        &self.instance
    }

    /// 以 `T` 的视图取出实例
    pub fn view<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.views
            .iter()
            .find_map(|view| view.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// 是否可赋值给 `T`
    pub fn is_assignable_to<T: ?Sized + 'static>(&self) -> bool {
        self.views.iter().any(|view| view.is::<Arc<T>>())
    }

    pub fn injectable(&self) -> Option<&Arc<dyn Injectable>> {
        self.injectable.as_ref()
    }
}

impl fmt::Debug for BeanInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanInstance")
            .field("type_name", &self.type_name)
            .field("views", &self.views.len())
            .field("injectable", &self.injectable.is_some())
            .finish()
    }
}

/// 注入点的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// 按显式名称 + 类型解析
    ByName(&'a str),
    /// 按类型解析
    ByType,
}

/// 注入点能力 - 由 `#[derive(Bean)]` 生成
///
/// 注入器只通过此 trait 访问 Bean 的字段，从不直接修改实例内部状态。
pub trait Injectable: Send + Sync {
    /// 该实例声明的注入点
    fn injection_points(&self) -> Vec<FieldDescriptor>;

    /// 按给定方式解析并赋值一个注入点
    fn inject(
        &self,
        field: &str,
        resolution: Resolution<'_>,
        registry: &BeanRegistry,
    ) -> ContainerResult<()>;
}

/// 注入槽位 - 在注入阶段被赋值一次
///
/// ```
/// use lwdic_core::Inject;
/// use std::sync::Arc;
///
/// let slot: Inject<i32> = Inject::default();
/// assert!(slot.get().is_none());
/// slot.set("value", Arc::new(7)).unwrap();
/// assert_eq!(slot.get(), Some(&7));
/// assert!(slot.set("value", Arc::new(8)).is_err());
/// ```
pub struct Inject<T: ?Sized> {
    slot: OnceLock<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// 赋值，重复赋值返回 `AlreadyInjected`
    pub fn set(&self, field: &str, value: Arc<T>) -> ContainerResult<()> {
        self.slot
            .set(value)
            .map_err(|_| crate::ContainerError::AlreadyInjected {
                field: field.to_string(),
                field_type: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn get(&self) -> Option<&T> {
        self.slot.get().map(|value| value.as_ref())
    }

    pub fn arc(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_plain_value_view() {
        let bean = BeanInstance::new(5_i32);
        assert_eq!(bean.type_name(), "i32");
        assert_eq!(bean.view::<i32>().as_deref(), Some(&5));
        assert!(!bean.is_assignable_to::<String>());
        assert!(bean.injectable().is_none());
    }

    #[test]
    fn test_trait_view_shares_instance() {
        let english = Arc::new(English);
        let bean = BeanInstance::from_arc(Arc::clone(&english)).with_view::<dyn Greeter>(english);

        let concrete = bean.view::<English>().unwrap();
        let greeter = bean.view::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert_eq!(
            Arc::as_ptr(&concrete) as *const (),
            Arc::as_ptr(&greeter) as *const ()
        );
    }

    #[test]
    fn test_inject_slot_for_trait_object() {
        let slot: Inject<dyn Greeter> = Inject::default();
        assert!(!slot.is_injected());
        slot.set("greeter", Arc::new(English)).unwrap();
        assert_eq!(slot.get().map(|g| g.greet()), Some("hello".to_string()));

        let err = slot.set("greeter", Arc::new(English)).unwrap_err();
        assert!(matches!(err, crate::ContainerError::AlreadyInjected { .. }));
    }
}
