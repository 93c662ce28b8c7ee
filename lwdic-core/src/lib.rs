// lwdic-core: 轻量级依赖注入容器
//
// 两阶段：
// - 注册：扫描命名空间中 #[derive(Bean)] 标记的类型，或通过 add_bean 手动注册
// - 注入：按类型或按名称为 Inject<T> 字段赋值
//
// 每个类型的编译期元数据由 inventory 收集，不依赖运行时反射。

extern crate self as lwdic_core;

pub mod app;
pub mod bean;
pub mod config;
pub mod constants;
pub mod container;
pub mod error;
pub mod factory;
pub mod injector;
pub mod logging;
pub mod planner;
pub mod registry;
pub mod scanner;
pub mod utils;

// 重新导出常用类型
pub use app::Application;
pub use bean::{BeanInstance, BeanRef, Inject, Injectable, Resolution};
pub use config::{
    ConfigValue, ContainerSettings, Environment, EnvironmentPropertySource, MapPropertySource,
    PropertySource, TomlPropertySource,
};
pub use container::{Container, ContainerBuilder};
pub use error::{
    ApplicationError, ApplicationResult, ContainerError, ContainerResult, InjectionFailure,
};
pub use factory::{ConstructorTable, InstanceFactory};
pub use injector::{FailurePolicy, InjectionReport, Injector};
pub use logging::{LogFormat, LoggingConfig};
pub use planner::{CandidateFailure, RegisteredBean, RegistrationPlanner, ScanReport};
pub use registry::{BeanId, BeanRegistry};
pub use scanner::{
    BeanManifest, CandidateType, FieldDescriptor, InventoryScanner, Scanner, StaticScanner,
};

pub use lwdic_core_macros::Bean;

// 导出 inventory 和 anyhow，供宏使用
pub use anyhow;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::abstract_bean;
    pub use crate::app::Application;
    pub use crate::bean::{Inject, Injectable};
    pub use crate::container::Container;
    pub use crate::error::{ApplicationResult, ContainerError, ContainerResult};
    pub use crate::injector::FailurePolicy;
    pub use crate::logging::{LogFormat, LoggingConfig};
    pub use crate::scanner::Scanner;
    pub use lwdic_core_macros::Bean;
    pub use anyhow::{anyhow, Context};
}
