use std::path::Path;

use crate::config::{
    ContainerSettings, Environment, EnvironmentPropertySource, PropertySource, TomlPropertySource,
};
use crate::constants;
use crate::container::{Container, ContainerBuilder};
use crate::error::{ApplicationResult, ContainerResult};
use crate::logging::LoggingConfig;

type Initializer = Box<dyn FnOnce(&mut Container) -> ContainerResult<()>>;

/// 应用程序
///
/// 启动顺序：配置 -> 日志 -> 容器 -> 扫描 -> 初始化器 -> 注入
pub struct Application {
    /// 应用名称
    name: String,

    /// 配置文件路径
    config_files: Vec<String>,

    /// 环境变量前缀
    env_prefix: String,

    /// 日志配置，未设置时从环境变量读取
    logging_config: Option<LoggingConfig>,

    /// 是否安装全局日志订阅者
    init_logging: bool,

    /// 额外的配置源
    property_sources: Vec<Box<dyn PropertySource>>,

    /// 代码中指定的命名空间，在配置中的命名空间之后扫描
    namespaces: Vec<String>,

    /// 替换默认的容器构建器（测试中注入 StaticScanner 等）
    container_builder: Option<ContainerBuilder>,

    /// 自定义初始化函数，在扫描之后、注入之前执行
    initializers: Vec<Initializer>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_files: vec![constants::DEFAULT_CONFIG_FILE.to_string()],
            env_prefix: constants::DEFAULT_ENV_PREFIX.to_string(),
            logging_config: None,
            init_logging: true,
            property_sources: Vec::new(),
            namespaces: Vec::new(),
            container_builder: None,
            initializers: Vec::new(),
        }
    }

    /// 设置配置文件路径
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files = vec![path.into()];
        self
    }

    pub fn config_files(mut self, paths: Vec<String>) -> Self {
        self.config_files = paths;
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 关闭日志初始化（由调用方自行安装订阅者）
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    pub fn property_source(mut self, source: Box<dyn PropertySource>) -> Self {
        self.property_sources.push(source);
        self
    }

    /// 添加需要扫描的命名空间
    pub fn scan(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn container_builder(mut self, builder: ContainerBuilder) -> Self {
        self.container_builder = Some(builder);
        self
    }

    /// 添加初始化器
    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Container) -> ContainerResult<()> + 'static,
    {
        self.initializers.push(Box::new(f));
        self
    }

    /// 运行应用，返回已启动的容器
    pub fn run(self) -> ApplicationResult<Container> {
        let Self {
            name,
            config_files,
            env_prefix,
            logging_config,
            init_logging,
            property_sources,
            namespaces,
            container_builder,
            initializers,
        } = self;

        let start_time = std::time::Instant::now();

        let mut environment = Environment::new();
        for config_file in &config_files {
            Self::try_load_config_file(&mut environment, config_file)?;
        }
        for source in property_sources {
            environment.add_property_source(source);
        }
        environment.add_property_source(Box::new(EnvironmentPropertySource::new(&env_prefix)));

        if init_logging {
            logging_config
                .unwrap_or_else(LoggingConfig::from_env)
                .merge_environment(&environment)?
                .init()?;
        }

        tracing::info!("Starting {} application", name);
        tracing::debug!("Environment variable prefix: {}", env_prefix);

        let settings = ContainerSettings::from_environment(&environment)?;
        let mut container = container_builder
            .unwrap_or_default()
            .settings(&settings)
            .build();

        let mut all_namespaces = settings.scan_namespaces;
        for namespace in namespaces {
            if !all_namespaces.contains(&namespace) {
                all_namespaces.push(namespace);
            }
        }
        if all_namespaces.is_empty() {
            tracing::warn!("No namespaces configured for scanning");
        }

        for namespace in &all_namespaces {
            let report = container.scan_package(namespace)?;
            for failure in &report.failed {
                tracing::warn!(
                    "Bean {} was not registered: {}",
                    failure.qualified_name,
                    failure.reason
                );
            }
        }

        for initializer in initializers {
            initializer(&mut container)?;
        }

        container.start()?;

        tracing::info!(
            "Started {} in {}ms ({} bean(s), {} key(s))",
            name,
            start_time.elapsed().as_millis(),
            container.bean_count(),
            container.key_count()
        );
        Ok(container)
    }

    /// 便捷方法：通过配置文件与环境变量运行
    pub fn run_with_defaults(name: impl Into<String>) -> ApplicationResult<Container> {
        Self::new(name).run()
    }

    /// 文件不存在时跳过，解析失败时报错
    fn try_load_config_file(environment: &mut Environment, config_file: &str) -> ApplicationResult<()> {
        if Path::new(config_file).exists() {
            let source = TomlPropertySource::from_file(config_file)?;
            tracing::info!("Loaded configuration from: {}", config_file);
            environment.add_property_source(Box::new(source));
        } else {
            tracing::debug!("Configuration file not found: {}", config_file);
        }
        Ok(())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new("Application")
    }
}
