//! 日志订阅者的安装
//!
//! 级别直接使用 `tracing::Level`，只有输出格式是本模块自己的类型。
//! 配置的合并发生在订阅者安装之前，因此非法值以错误返回，不写日志。

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use crate::config::Environment;
use crate::constants;
use crate::error::{ApplicationError, ApplicationResult};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Json,
    /// 多行输出，适合开发
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [Self::Compact, Self::Full, Self::Json, Self::Pretty]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid log format: {}", s))
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Full => "full",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 没有过滤指令时的默认级别
    pub level: Level,
    pub format: LogFormat,
    /// 是否输出模块路径
    pub show_target: bool,
    /// `EnvFilter` 指令，例如 "lwdic_core=debug,app=warn"
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            show_target: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 读取 RUST_LOG 作为过滤指令，其余保持默认
    pub fn from_env() -> Self {
        Self {
            filter: std::env::var("RUST_LOG").ok().filter(|f| !f.trim().is_empty()),
            ..Self::default()
        }
    }

    /// 用配置中的 logging.level / logging.format 覆盖，非法值返回 `Config` 错误
    pub fn merge_environment(mut self, env: &Environment) -> ApplicationResult<Self> {
        if let Some(raw) = env.get_string(constants::LOGGING_LEVEL_KEY) {
            self.level = raw.trim().parse().map_err(|_| {
                ApplicationError::Config(format!(
                    "Invalid value '{}' for {}",
                    raw,
                    constants::LOGGING_LEVEL_KEY
                ))
            })?;
        }
        if let Some(raw) = env.get_string(constants::LOGGING_FORMAT_KEY) {
            self.format = raw.parse().map_err(|e: String| {
                ApplicationError::Config(format!("{} ({})", e, constants::LOGGING_FORMAT_KEY))
            })?;
        }
        Ok(self)
    }

    fn env_filter(&self) -> EnvFilter {
        let builder =
            EnvFilter::builder().with_default_directive(LevelFilter::from_level(self.level).into());
        match &self.filter {
            Some(filter) => builder.parse_lossy(filter),
            None => builder.from_env_lossy(),
        }
    }

    /// 安装全局订阅者，重复安装返回 `LoggingInitFailed`
    pub fn init(self) -> ApplicationResult<()> {
        let builder = fmt()
            .with_env_filter(self.env_filter())
            .with_target(self.show_target);

        let result = match self.format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Full => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };
        result.map_err(|e| ApplicationError::LoggingInitFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapPropertySource};

    fn env_with(level: &str, format: &str) -> Environment {
        Environment::new().with_property_source(Box::new(
            MapPropertySource::new("logging")
                .with_property(constants::LOGGING_LEVEL_KEY, ConfigValue::String(level.into()))
                .with_property(constants::LOGGING_FORMAT_KEY, ConfigValue::String(format.into())),
        ))
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_merge_environment() {
        let config = LoggingConfig::new()
            .merge_environment(&env_with("trace", "full"))
            .unwrap();
        assert_eq!(config.level, Level::TRACE);
        assert_eq!(config.format, LogFormat::Full);
    }

    #[test]
    fn test_invalid_logging_values_are_returned() {
        let err = LoggingConfig::new()
            .merge_environment(&env_with("loud", "compact"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config(ref m) if m.contains(constants::LOGGING_LEVEL_KEY)));

        let err = LoggingConfig::new()
            .merge_environment(&env_with("warn", "bogus"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config(ref m) if m.contains("bogus")));
    }

    #[test]
    fn test_explicit_filter_is_used() {
        let config = LoggingConfig::new()
            .level(Level::WARN)
            .filter("lwdic_core=trace");
        assert_eq!(config.level, Level::WARN);
        assert!(config.env_filter().to_string().contains("lwdic_core=trace"));
    }
}
