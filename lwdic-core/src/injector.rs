//! 字段注入
//!
//! 在所有注册完成后执行一次。每个不同的实例只访问一次，
//! 显式名称总是优先于按类型注入。

use std::str::FromStr;

use crate::bean::Resolution;
use crate::error::{ContainerError, ContainerResult, InjectionFailure};
use crate::registry::BeanRegistry;
use crate::scanner::FieldDescriptor;
use crate::utils::naming;

/// 注入失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 访问所有字段，最后以 `InjectionFailed` 汇总返回
    #[default]
    CollectAll,
    /// 遇到第一个失败立即返回该错误
    FailFast,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "collect-all" | "collect" => Ok(FailurePolicy::CollectAll),
            "fail-fast" => Ok(FailurePolicy::FailFast),
            _ => Err(format!("Invalid injection failure policy: {}", s)),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::CollectAll => write!(f, "collect-all"),
            FailurePolicy::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// 一次注入的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// 访问过的实例数
    pub beans_visited: usize,
    /// 成功赋值的字段数
    pub fields_injected: usize,
}

/// 注入器
#[derive(Debug, Clone, Copy, Default)]
pub struct Injector {
    policy: FailurePolicy,
}

impl Injector {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// 字段的解析方式，两个标记都没有时返回 None
    pub fn resolution_for(field: &FieldDescriptor) -> Option<Resolution<'_>> {
        match (&field.explicit_name, field.type_injection) {
            (Some(name), _) => Some(Resolution::ByName(name)),
            (None, true) => Some(Resolution::ByType),
            (None, false) => None,
        }
    }

    /// 对所有不同的实例执行注入
    pub fn inject_all(&self, registry: &BeanRegistry) -> ContainerResult<InjectionReport> {
        let mut report = InjectionReport::default();
        let mut failures = Vec::new();

        for (_, record) in registry.distinct_instances() {
            report.beans_visited += 1;
            let Some(target) = record.injectable() else {
                continue;
            };

            for field in target.injection_points() {
                let Some(resolution) = Self::resolution_for(&field) else {
                    continue;
                };

                tracing::trace!(
                    "Injecting {}.{} ({:?})",
                    record.type_name(),
                    field.name,
                    resolution
                );
                match target.inject(&field.name, resolution, registry) {
                    Ok(()) => report.fields_injected += 1,
                    Err(e) => {
                        tracing::error!(
                            "An error occurred while injecting field '{}' of bean {}: {}",
                            field.name,
                            naming::short_type_name(record.type_name()),
                            e
                        );
                        if self.policy == FailurePolicy::FailFast {
                            return Err(e);
                        }
                        failures.push(InjectionFailure {
                            bean: record.type_name().to_string(),
                            field: field.name.clone(),
                            error: e,
                        });
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(ContainerError::InjectionFailed { failures });
        }

        tracing::debug!(
            "Injected {} field(s) across {} bean(s)",
            report.fields_injected,
            report.beans_visited
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bean::{BeanInstance, Inject, Injectable};

    /// 手写的注入点实现，等价于派生宏生成的代码
    #[derive(Default)]
    struct Target {
        named: Inject<i32>,
        typed: Inject<String>,
    }

    impl Injectable for Target {
        fn injection_points(&self) -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::new("named", "i32").by_type().named("answer"),
                FieldDescriptor::new("typed", std::any::type_name::<String>()).by_type(),
                FieldDescriptor::new("ignored", "u8"),
            ]
        }

        fn inject(
            &self,
            field: &str,
            resolution: Resolution<'_>,
            registry: &BeanRegistry,
        ) -> ContainerResult<()> {
            match field {
                "named" => self.named.set(field, registry.resolve::<i32>(resolution)?),
                "typed" => self.typed.set(field, registry.resolve::<String>(resolution)?),
                _ => Err(ContainerError::UnknownInjectionPoint {
                    bean: "Target".to_string(),
                    field: field.to_string(),
                }),
            }
        }
    }

    fn register_target(registry: &mut BeanRegistry) -> Arc<Target> {
        let target = Arc::new(Target::default());
        let instance = BeanInstance::from_arc(Arc::clone(&target))
            .with_injectable(Arc::clone(&target) as Arc<dyn Injectable>);
        registry.register_exclusive("target", instance).unwrap();
        target
    }

    #[test]
    fn test_resolution_precedence() {
        let both = FieldDescriptor::new("f", "i32").by_type().named("x");
        assert_eq!(Injector::resolution_for(&both), Some(Resolution::ByName("x")));

        let typed = FieldDescriptor::new("f", "i32").by_type();
        assert_eq!(Injector::resolution_for(&typed), Some(Resolution::ByType));

        let none = FieldDescriptor::new("f", "i32");
        assert_eq!(Injector::resolution_for(&none), None);
    }

    #[test]
    fn test_explicit_name_wins_over_type() {
        let mut registry = BeanRegistry::new();
        let target = register_target(&mut registry);
        registry.register_exclusive("answer", BeanInstance::new(42_i32)).unwrap();
        registry.register_exclusive("i32", BeanInstance::new(-1_i32)).unwrap();
        registry
            .register_exclusive(std::any::type_name::<String>(), BeanInstance::new("hi".to_string()))
            .unwrap();

        let report = Injector::default().inject_all(&registry).unwrap();
        assert_eq!(report.fields_injected, 2);
        assert_eq!(report.beans_visited, 4);
        assert_eq!(target.named.get(), Some(&42));
        assert_eq!(target.typed.get().map(String::as_str), Some("hi"));
    }

    #[test]
    fn test_multiply_keyed_instance_injected_once() {
        let mut registry = BeanRegistry::new();
        let target = register_target(&mut registry);
        let id = registry.ids_for("target")[0];
        registry.register_shared("alias-one", id).unwrap();
        registry.register_shared("alias-two", id).unwrap();
        registry.register_exclusive("answer", BeanInstance::new(1_i32)).unwrap();
        registry
            .register_exclusive(std::any::type_name::<String>(), BeanInstance::new(String::new()))
            .unwrap();

        // 若同一实例被访问两次，第二次会返回 AlreadyInjected
        let report = Injector::default().inject_all(&registry).unwrap();
        assert_eq!(report.fields_injected, 2);
        assert!(target.named.is_injected());
    }

    #[test]
    fn test_collect_all_reports_every_field() {
        let mut registry = BeanRegistry::new();
        let target = register_target(&mut registry);

        let err = Injector::new(FailurePolicy::CollectAll)
            .inject_all(&registry)
            .unwrap_err();
        match err {
            ContainerError::InjectionFailed { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].field, "named");
                assert_eq!(failures[1].field, "typed");
                assert!(failures.iter().all(|f| f.error.is_resolution_error()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!target.named.is_injected());
    }

    #[test]
    fn test_fail_fast_returns_first_error() {
        let mut registry = BeanRegistry::new();
        let target = register_target(&mut registry);
        registry
            .register_exclusive(std::any::type_name::<String>(), BeanInstance::new("hi".to_string()))
            .unwrap();

        let err = Injector::new(FailurePolicy::FailFast)
            .inject_all(&registry)
            .unwrap_err();
        assert!(matches!(err, ContainerError::NoSuitableBean { ref key, .. } if key == "answer"));
        assert!(!target.typed.is_injected());
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!("collect-all".parse::<FailurePolicy>().unwrap(), FailurePolicy::CollectAll);
        assert_eq!("FAIL_FAST".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailFast);
        assert!("sometimes".parse::<FailurePolicy>().is_err());
        assert_eq!(FailurePolicy::FailFast.to_string(), "fail-fast");
    }
}
