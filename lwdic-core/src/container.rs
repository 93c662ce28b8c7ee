use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    bean::{BeanInstance, BeanRef},
    config::ContainerSettings,
    error::{ContainerError, ContainerResult},
    factory::{ConstructorTable, InstanceFactory},
    injector::{FailurePolicy, InjectionReport, Injector},
    planner::{RegistrationPlanner, ScanReport},
    registry::BeanRegistry,
    scanner::{InventoryScanner, Scanner},
};

/// 依赖注入容器
///
/// 两阶段生命周期：
/// 1. 注册：任意次数的 `scan_package` / `add_bean`
/// 2. 注入：一次 `start`，之后只允许读取
///
/// 容器不做任何加锁，调用方不能在多个线程间交错注册与注入。
pub struct Container {
    registry: BeanRegistry,
    scanner: Box<dyn Scanner>,
    factory: Box<dyn InstanceFactory>,
    injector: Injector,
    started: bool,
}

impl Container {
    /// 使用编译期清单创建容器
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 扫描命名空间并注册其中所有标记的类型
    ///
    /// 单个候选类型的失败只会被记录到 `ScanReport`，不会中断扫描。
    pub fn scan_package(&mut self, namespace: &str) -> ContainerResult<ScanReport> {
        if self.started {
            tracing::warn!("Rejecting scan of '{}' after container start", namespace);
            return Err(ContainerError::RegistrationClosed {
                key: namespace.to_string(),
            });
        }

        tracing::info!("Scanning package {}...", namespace);
        let candidates = self.scanner.scan(namespace);
        let total = candidates.len();
        if total == 0 {
            tracing::warn!("No marked types found in namespace '{}'", namespace);
        }

        let mut report = ScanReport::new(namespace);
        RegistrationPlanner::new(self.factory.as_ref()).register_all(
            candidates,
            &mut self.registry,
            &mut report,
        );

        tracing::info!(
            "Scan of '{}' completed: {} registered, {} skipped, {} abstract, {} failed (of {})",
            namespace,
            report.registered.len(),
            report.skipped.len(),
            report.abstracts.len(),
            report.failed.len(),
            total
        );
        Ok(report)
    }

    /// 以独占方式注册一个值
    pub fn add_bean<T: Any + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        bean: T,
    ) -> ContainerResult<()> {
        self.add_instance(key, BeanInstance::new(bean))
    }

    /// 以独占方式注册一个已构造好的实例（可以带视图和注入点）
    pub fn add_instance(
        &mut self,
        key: impl Into<String>,
        instance: BeanInstance,
    ) -> ContainerResult<()> {
        let key = key.into();
        if self.started {
            return Err(ContainerError::RegistrationClosed { key });
        }
        self.registry.register_exclusive(key, instance)?;
        Ok(())
    }

    /// 执行注入阶段，只能调用一次
    ///
    /// 失败时容器仍被视为已启动，已成功注入的字段保持不变。
    pub fn start(&mut self) -> ContainerResult<InjectionReport> {
        if self.started {
            return Err(ContainerError::AlreadyStarted);
        }
        self.started = true;

        tracing::info!(
            "Injecting beans: {} instance(s) under {} key(s), policy {}",
            self.registry.bean_count(),
            self.registry.key_count(),
            self.injector.policy()
        );
        let report = self.injector.inject_all(&self.registry)?;
        tracing::info!("Container started");
        Ok(report)
    }

    /// `start` 的别名
    pub fn inject_beans(&mut self) -> ContainerResult<InjectionReport> {
        self.start()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// 注入阶段使用的失败策略
    pub fn failure_policy(&self) -> FailurePolicy {
        self.injector.policy()
    }

    /// 按类型获取 Bean
    pub fn get_bean_by_type<T: ?Sized + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.registry.resolve_by_type::<T>()
    }

    /// 按名称获取 Bean，实例必须可赋值给 `T`
    pub fn get_bean_by_name_and_type<T: ?Sized + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Arc<T>> {
        self.registry.resolve_by_name_and_type::<T>(name)
    }

    /// key -> 实例 的快照
    pub fn get_beans(&self) -> HashMap<String, Vec<BeanRef>> {
        self.registry.snapshot()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    pub fn key_count(&self) -> usize {
        self.registry.key_count()
    }

    pub fn bean_count(&self) -> usize {
        self.registry.bean_count()
    }

    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.registry.key_count())
            .field("beans", &self.registry.bean_count())
            .field("policy", &self.injector.policy())
            .field("started", &self.started)
            .finish()
    }
}

/// 容器构建器
pub struct ContainerBuilder {
    scanner: Option<Box<dyn Scanner>>,
    factory: Option<Box<dyn InstanceFactory>>,
    policy: Option<FailurePolicy>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            scanner: None,
            factory: None,
            policy: None,
        }
    }

    /// 替换默认的 `InventoryScanner`
    pub fn scanner(mut self, scanner: impl Scanner + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    /// 替换默认的 `ConstructorTable::from_inventory()`
    pub fn factory(mut self, factory: impl InstanceFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// 应用配置，代码中显式设置的值优先
    pub fn settings(mut self, settings: &ContainerSettings) -> Self {
        if self.policy.is_none() {
            self.policy = settings.failure_policy;
        }
        self
    }

    pub fn build(self) -> Container {
        Container {
            registry: BeanRegistry::new(),
            scanner: self.scanner.unwrap_or_else(|| Box::new(InventoryScanner)),
            factory: self
                .factory
                .unwrap_or_else(|| Box::new(ConstructorTable::from_inventory())),
            injector: Injector::new(self.policy.unwrap_or_default()),
            started: false,
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
