//! 实例工厂
//!
//! 给定限定类型名，调用其无参构造函数得到一个 `BeanInstance`。
//! 构造失败（未知类型、构造返回错误、构造 panic）统一转换为 `ContainerError`，
//! 由调用方决定如何上报。

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::bean::BeanInstance;
use crate::error::{ContainerError, ContainerResult};
use crate::scanner::BeanManifest;

/// 实例工厂 trait
pub trait InstanceFactory {
    /// 创建一个实例
    fn create(&self, type_name: &str) -> ContainerResult<BeanInstance>;
}

/// 构造函数
pub type Constructor = Box<dyn Fn() -> anyhow::Result<BeanInstance> + Send + Sync>;

/// 按类型名索引的构造函数表
#[derive(Default)]
pub struct ConstructorTable {
    constructors: HashMap<String, Constructor>,
}

impl ConstructorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 收集所有编译期清单中的构造函数
    pub fn from_inventory() -> Self {
        let mut table = Self::new();
        for manifest in inventory::iter::<BeanManifest>() {
            if let Some(construct) = manifest.construct {
                let candidate = (manifest.describe)();
                table.insert(candidate.qualified_name, construct);
            }
        }
        tracing::trace!("Loaded {} constructor(s) from manifest", table.len());
        table
    }

    /// 注册构造函数，同名覆盖
    pub fn insert<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> anyhow::Result<BeanInstance> + Send + Sync + 'static,
    {
        self.constructors.insert(type_name.into(), Box::new(constructor));
    }

    /// 构建器风格的注册
    pub fn with<F>(mut self, type_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> anyhow::Result<BeanInstance> + Send + Sync + 'static,
    {
        self.insert(type_name, constructor);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl InstanceFactory for ConstructorTable {
    fn create(&self, type_name: &str) -> ContainerResult<BeanInstance> {
        let constructor =
            self.constructors
                .get(type_name)
                .ok_or_else(|| ContainerError::UnknownBeanType {
                    type_name: type_name.to_string(),
                })?;

        tracing::trace!("Creating instance for bean {}", type_name);
        match catch_unwind(AssertUnwindSafe(|| constructor())) {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(source)) => Err(ContainerError::BeanCreationFailed {
                type_name: type_name.to_string(),
                source,
            }),
            Err(payload) => Err(ContainerError::BeanCreationFailed {
                type_name: type_name.to_string(),
                source: anyhow::anyhow!("constructor panicked: {}", panic_message(&*payload)),
            }),
        }
    }
}

impl std::fmt::Debug for ConstructorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("ConstructorTable")
            .field("constructors", &names)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_type() {
        let table = ConstructorTable::new().with("demo::Counter", || Ok(BeanInstance::new(0_u32)));
        let instance = table.create("demo::Counter").unwrap();
        assert_eq!(instance.view::<u32>().as_deref(), Some(&0));
        assert!(table.contains("demo::Counter"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let table = ConstructorTable::new();
        let err = table.create("demo::Abstract").unwrap_err();
        assert!(matches!(err, ContainerError::UnknownBeanType { ref type_name } if type_name == "demo::Abstract"));
    }

    #[test]
    fn test_constructor_error_is_wrapped() {
        let table = ConstructorTable::new()
            .with("demo::Broken", || Err(anyhow::anyhow!("database unavailable")));
        let err = table.create("demo::Broken").unwrap_err();
        assert!(err.to_string().contains("database unavailable"));
        assert!(matches!(err, ContainerError::BeanCreationFailed { .. }));
    }

    #[test]
    fn test_constructor_panic_is_isolated() {
        let table = ConstructorTable::new().with("demo::Panicking", || panic!("boom"));
        let err = table.create("demo::Panicking").unwrap_err();
        assert!(err.to_string().contains("constructor panicked: boom"));
    }
}
