//! 注册规划
//!
//! 对每个候选类型：跳过不可注入的和抽象的 -> 检查主 key -> 创建实例 -> 主 key 独占注册 ->
//! 直接接口与直接父类型共享注册。只索引直接的父类型，不遍历传递祖先。
//!
//! 主 key 已存在时不会调用构造函数，重复扫描同一命名空间不会重复构造。

use crate::error::ContainerError;
use crate::factory::InstanceFactory;
use crate::registry::BeanRegistry;
use crate::scanner::CandidateType;

/// 成功注册的 Bean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBean {
    pub qualified_name: String,
    pub primary_key: String,
    /// 所有 key，主 key 在前
    pub keys: Vec<String>,
}

/// 被丢弃的候选类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub qualified_name: String,
    pub reason: String,
}

/// 一次扫描的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub namespace: String,
    pub registered: Vec<RegisteredBean>,
    /// `injectable = false` 的候选类型
    pub skipped: Vec<String>,
    /// 抽象类型，不产生实例
    pub abstracts: Vec<String>,
    pub failed: Vec<CandidateFailure>,
}

impl ScanReport {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 注册规划器
pub struct RegistrationPlanner<'a> {
    factory: &'a dyn InstanceFactory,
}

impl<'a> RegistrationPlanner<'a> {
    pub fn new(factory: &'a dyn InstanceFactory) -> Self {
        Self { factory }
    }

    /// 按扫描顺序注册所有候选类型，单个候选失败不影响其它候选
    pub fn register_all(
        &self,
        candidates: Vec<CandidateType>,
        registry: &mut BeanRegistry,
        report: &mut ScanReport,
    ) {
        for candidate in candidates {
            self.register_candidate(candidate, registry, report);
        }
    }

    fn register_candidate(
        &self,
        candidate: CandidateType,
        registry: &mut BeanRegistry,
        report: &mut ScanReport,
    ) {
        let name = candidate.qualified_name.clone();

        if !candidate.injectable {
            tracing::info!("Skipping bean {} with flag injectable=false", name);
            report.skipped.push(name);
            return;
        }

        if candidate.is_abstract {
            tracing::debug!("Bean {} is abstract, no instance created", name);
            report.abstracts.push(name);
            return;
        }

        let primary_key = candidate.primary_key().to_string();
        if registry.contains_key(&primary_key) {
            let e = ContainerError::BeanAlreadyDefined { key: primary_key };
            tracing::error!("Failed to register bean '{}': {}", name, e);
            report.failed.push(CandidateFailure {
                qualified_name: name,
                reason: e.to_string(),
            });
            return;
        }

        let instance = match self.factory.create(&name) {
            Ok(instance) => instance,
            Err(e) => {
                tracing::error!("Failed to create bean '{}': {}", name, e);
                report.failed.push(CandidateFailure {
                    qualified_name: name,
                    reason: e.to_string(),
                });
                return;
            }
        };

        tracing::info!("Registering bean of type {} with name {}", name, primary_key);
        let id = match registry.register_exclusive(primary_key.clone(), instance) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to register bean '{}': {}", name, e);
                report.failed.push(CandidateFailure {
                    qualified_name: name,
                    reason: e.to_string(),
                });
                return;
            }
        };

        let mut keys = vec![primary_key.clone()];
        for key in candidate.interfaces.into_iter().chain(candidate.superclass) {
            match registry.register_shared(key.clone(), id) {
                Ok(()) => keys.push(key),
                Err(e) => tracing::error!("Failed to register bean '{}' under '{}': {}", name, key, e),
            }
        }

        report.registered.push(RegisteredBean {
            qualified_name: name,
            primary_key,
            keys,
        });
    }
}
