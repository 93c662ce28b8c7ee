//! 候选类型的发现
//!
//! 没有运行时反射：`#[derive(Bean)]` 与 `abstract_bean!` 在编译期生成 `BeanManifest`，
//! 通过 `inventory` 收集。`Scanner` 只负责按命名空间产出元数据，不包含任何容器逻辑。

use crate::bean::BeanInstance;
use crate::utils::naming;

/// 注入字段的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// 字段名
    pub name: String,
    /// 字段的限定类型名
    pub field_type: String,
    /// 是否标记为按类型注入
    pub type_injection: bool,
    /// 显式名称，存在即表示按名称注入
    pub explicit_name: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            type_injection: false,
            explicit_name: None,
        }
    }

    /// 标记为按类型注入
    pub fn by_type(mut self) -> Self {
        self.type_injection = true;
        self
    }

    /// 标记为按名称注入
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }
}

/// 扫描得到的候选类型（只读元数据）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateType {
    /// 限定类型名
    pub qualified_name: String,
    /// 为 false 时跳过注册，默认 true
    pub injectable: bool,
    /// 抽象类型（没有构造函数），只被发现，不被实例化
    pub is_abstract: bool,
    /// 别名，替代限定类型名作为主 key
    pub alias: Option<String>,
    /// 直接实现的接口
    pub interfaces: Vec<String>,
    /// 直接父类型
    pub superclass: Option<String>,
    /// 注入字段
    pub fields: Vec<FieldDescriptor>,
}

impl CandidateType {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            injectable: true,
            is_abstract: false,
            alias: None,
            interfaces: Vec::new(),
            superclass: None,
            fields: Vec::new(),
        }
    }

    pub fn with_injectable(mut self, injectable: bool) -> Self {
        self.injectable = injectable;
        self
    }

    /// 标记为抽象类型
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 主 key：别名优先，否则为限定类型名
    pub fn primary_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.qualified_name)
    }
}

/// 扫描器 - 外部协作者
pub trait Scanner {
    /// 返回命名空间下的候选类型，顺序即注册顺序
    fn scan(&self, namespace: &str) -> Vec<CandidateType>;
}

/// 构造函数类型（生成代码中的无参构造）
pub type ManifestConstructor = fn() -> anyhow::Result<BeanInstance>;

/// 编译期生成的清单条目
pub struct BeanManifest {
    /// 声明所在的模块路径
    pub module_path: &'static str,
    /// 元数据
    pub describe: fn() -> CandidateType,
    /// 无参构造，抽象类型为 None
    pub construct: Option<ManifestConstructor>,
}

inventory::collect!(BeanManifest);

/// 基于 inventory 清单的扫描器
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryScanner;

impl Scanner for InventoryScanner {
    fn scan(&self, namespace: &str) -> Vec<CandidateType> {
        let mut candidates: Vec<CandidateType> = inventory::iter::<BeanManifest>()
            .filter(|manifest| naming::is_within_namespace(manifest.module_path, namespace))
            .map(|manifest| {
                let candidate = (manifest.describe)();
                if manifest.construct.is_none() && candidate.injectable {
                    candidate.as_abstract()
                } else {
                    candidate
                }
            })
            .collect();
        candidates.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        tracing::debug!(
            "Found {} marked type(s) in namespace '{}'",
            candidates.len(),
            namespace
        );
        candidates
    }
}

/// 基于显式列表的扫描器，命名空间由限定类型名推导
#[derive(Debug, Default, Clone)]
pub struct StaticScanner {
    candidates: Vec<CandidateType>,
}

impl StaticScanner {
    pub fn new(candidates: Vec<CandidateType>) -> Self {
        Self { candidates }
    }

    pub fn with_candidate(mut self, candidate: CandidateType) -> Self {
        self.candidates.push(candidate);
        self
    }
}

impl Scanner for StaticScanner {
    fn scan(&self, namespace: &str) -> Vec<CandidateType> {
        self.candidates
            .iter()
            .filter(|candidate| {
                naming::is_within_namespace(
                    naming::namespace_of(&candidate.qualified_name),
                    namespace,
                )
            })
            .cloned()
            .collect()
    }
}

/// 声明一个被标记但不可实例化的抽象类型（trait）
///
/// 它会被扫描到，但没有构造函数，实例创建失败后被丢弃。
///
/// ```ignore
/// pub trait AbstractBase: Send + Sync {}
/// lwdic_core::abstract_bean!(dyn AbstractBase);
/// ```
#[macro_export]
macro_rules! abstract_bean {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::scanner::BeanManifest {
                module_path: module_path!(),
                describe: || $crate::scanner::CandidateType::new(::std::any::type_name::<$ty>()),
                construct: None,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_prefers_alias() {
        let plain = CandidateType::new("demo::Service");
        assert_eq!(plain.primary_key(), "demo::Service");

        let named = plain.with_alias("service");
        assert_eq!(named.primary_key(), "service");
    }

    #[test]
    fn test_field_descriptor_markers() {
        let field = FieldDescriptor::new("value", "i32").by_type().named("a");
        assert!(field.type_injection);
        assert_eq!(field.explicit_name.as_deref(), Some("a"));
    }

    #[test]
    fn test_static_scanner_filters_by_namespace() {
        let scanner = StaticScanner::new(vec![
            CandidateType::new("app::service::UserService"),
            CandidateType::new("app::repo::UserRepo"),
            CandidateType::new("dyn app::service::Api"),
            CandidateType::new("application::Other"),
        ]);

        let names: Vec<String> = scanner
            .scan("app::service")
            .into_iter()
            .map(|c| c.qualified_name)
            .collect();
        assert_eq!(names, vec!["app::service::UserService", "dyn app::service::Api"]);

        assert_eq!(scanner.scan("app").len(), 3);
        assert!(scanner.scan("missing").is_empty());
    }
}
