/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "lwdic.toml";

/// 默认环境变量前缀，例如 LWDIC_CONTAINER_SCAN_NAMESPACES
pub const DEFAULT_ENV_PREFIX: &str = "LWDIC_";

/// 需要扫描的命名空间（数组或逗号分隔字符串）
pub const SCAN_NAMESPACES_KEY: &str = "container.scan.namespaces";

/// 注入失败策略：collect-all | fail-fast
pub const FAILURE_POLICY_KEY: &str = "container.injection.failure-policy";

/// 日志级别
pub const LOGGING_LEVEL_KEY: &str = "logging.level";

/// 日志格式
pub const LOGGING_FORMAT_KEY: &str = "logging.format";
