//! 统一的错误处理类型
//!
//! 注册与解析失败使用 `ContainerError`，启动引导（配置、日志）使用 `ApplicationError`。
//! 构造函数内部的错误以 `anyhow::Error` 的形式作为 `source` 保留。

use thiserror::Error;

/// 容器操作结果
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动结果
pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

/// 注入阶段单个字段的失败记录
#[derive(Debug)]
pub struct InjectionFailure {
    /// 目标 Bean 的类型名
    pub bean: String,
    /// 字段名
    pub field: String,
    /// 解析失败的原因
    pub error: ContainerError,
}

impl std::fmt::Display for InjectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.bean, self.field, self.error)
    }
}

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 独占注册的 key 已存在
    #[error("Cannot create bean '{key}'. A bean with the name '{key}' is already defined.")]
    BeanAlreadyDefined { key: String },

    /// 解析时匹配到多个候选实例
    #[error("More than one bean was found for '{key}': [{}]", .candidates.join(", "))]
    BeanConflict { key: String, candidates: Vec<String> },

    /// 解析时没有匹配到任何候选实例
    #[error("No suitable bean of type '{requested}' was found under '{key}'.")]
    NoSuitableBean { key: String, requested: String },

    /// 共享注册引用了不属于本注册表的实例
    #[error("Cannot register '{key}': bean id {id} does not belong to this registry.")]
    UnknownBeanId { id: usize, key: String },

    /// 实例工厂中没有该类型的构造函数
    #[error("No constructor is known for bean type '{type_name}'.")]
    UnknownBeanType { type_name: String },

    /// 构造函数返回错误或 panic
    #[error("An error occurred while creating an instance for bean '{type_name}': {source}")]
    BeanCreationFailed {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 注入点已经被赋值
    #[error("Injection point '{field}' of type '{field_type}' was already injected.")]
    AlreadyInjected { field: String, field_type: String },

    /// Bean 没有声明该注入点
    #[error("Bean '{bean}' has no injection point named '{field}'.")]
    UnknownInjectionPoint { bean: String, field: String },

    /// 注入阶段收集到的全部失败
    #[error("Injection failed for {} field(s): {}", .failures.len(), summarize(.failures))]
    InjectionFailed { failures: Vec<InjectionFailure> },

    /// 注入阶段开始后不再接受注册
    #[error("Cannot register '{key}': the container has already been started.")]
    RegistrationClosed { key: String },

    /// 注入阶段只能执行一次
    #[error("The container has already been started.")]
    AlreadyStarted,
}

fn summarize(failures: &[InjectionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ContainerError {
    /// 是否为解析类错误（`NoSuitableBean` / `BeanConflict`）
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ContainerError::NoSuitableBean { .. } | ContainerError::BeanConflict { .. }
        )
    }
}

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}
