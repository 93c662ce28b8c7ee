use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants;
use crate::error::{ApplicationError, ApplicationResult};
use crate::injector::FailurePolicy;

/// 配置值类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// 数组，或逗号分隔的字符串
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            ConfigValue::Array(values) => Some(
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            ConfigValue::String(s) => Some(
                s.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 数字越大优先级越高
    fn priority(&self) -> i32 {
        0
    }
}

/// 按优先级组合多个配置源
#[derive(Default)]
pub struct Environment {
    sources: Vec<Box<dyn PropertySource>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("Environment").field("sources", &names).finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加配置源，按优先级降序保存
    pub fn add_property_source(&mut self, source: Box<dyn PropertySource>) {
        self.sources.push(source);
        self.sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub fn with_property_source(mut self, source: Box<dyn PropertySource>) -> Self {
        self.add_property_source(source);
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        for source in &self.sources {
            if let Some(value) = source.get(key) {
                tracing::debug!("Config '{}' found in source '{}'", key, source.name());
                return Some(value);
            }
        }
        tracing::trace!("Config '{}' not found in any source", key);
        None
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(String::from))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(|v| v.as_string_list())
    }
}

// ========== Property Sources ==========

/// 环境变量配置源
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100,
        }
    }

    /// container.injection.failure-policy -> LWDIC_CONTAINER_INJECTION_FAILURE_POLICY
    fn key_to_env(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.replace(['.', '-'], "_").to_uppercase()
        )
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(self.key_to_env(key))
            .ok()
            .map(ConfigValue::String)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 配置源，嵌套表被展平为点分 key
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl TomlPropertySource {
    pub fn from_file(path: impl AsRef<Path>) -> ApplicationResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ApplicationError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::parse(&content, path.to_string_lossy().to_string())
    }

    pub fn parse(content: &str, name: impl Into<String>) -> ApplicationResult<Self> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| ApplicationError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut properties = HashMap::new();
        Self::flatten(&value, String::new(), &mut properties);

        Ok(Self {
            name: name.into(),
            properties,
            priority: 0,
        })
    }

    /// { container: { scan: { namespaces: [..] } } } -> "container.scan.namespaces"
    fn flatten(value: &toml::Value, prefix: String, result: &mut HashMap<String, ConfigValue>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let nested = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten(val, nested, result);
                }
            }
            other => {
                if let Some(converted) = Self::convert(other) {
                    result.insert(prefix, converted);
                }
            }
        }
    }

    fn convert(value: &toml::Value) -> Option<ConfigValue> {
        match value {
            toml::Value::String(s) => Some(ConfigValue::String(s.clone())),
            toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
            toml::Value::Float(f) => Some(ConfigValue::Float(*f)),
            toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
            toml::Value::Datetime(dt) => Some(ConfigValue::String(dt.to_string())),
            toml::Value::Array(values) => Some(ConfigValue::Array(
                values.iter().filter_map(Self::convert).collect(),
            )),
            toml::Value::Table(_) => None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源（用于测试或运行时配置）
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

// ========== Container Settings ==========

/// 容器设置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSettings {
    /// 启动时扫描的命名空间
    pub scan_namespaces: Vec<String>,
    /// 注入失败策略，未配置时为 None
    pub failure_policy: Option<FailurePolicy>,
}

impl ContainerSettings {
    pub fn from_environment(env: &Environment) -> ApplicationResult<Self> {
        let scan_namespaces = env
            .get_string_list(constants::SCAN_NAMESPACES_KEY)
            .unwrap_or_default();

        let failure_policy = env
            .get_string(constants::FAILURE_POLICY_KEY)
            .map(|raw| raw.parse::<FailurePolicy>())
            .transpose()
            .map_err(ApplicationError::Config)?;

        Ok(Self {
            scan_namespaces,
            failure_policy,
        })
    }
}
