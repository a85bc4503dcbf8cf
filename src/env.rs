//! 统一的环境变量管理
//!
//! 提供类型安全、可验证的环境变量访问。配置文件中的字段通过
//! `ISUKU__SECTION__FIELD` 覆盖，这里只定义命令行运行时直接读取的变量。

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "ISUKU_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }

    /// 只输出错误
    pub struct Quiet;
    impl EnvVar<bool> for Quiet {
        const NAME: &'static str = "ISUKU_QUIET";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Only report errors";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 语言状态相关环境变量
pub mod i18n {
    use super::*;

    /// 浏览器状态文件路径，覆盖配置中的 `state.path`
    pub struct StatePath;
    impl EnvVar<String> for StatePath {
        const NAME: &'static str = "ISUKU_STATE_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the persisted cookie/localStorage state";

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "State path cannot be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(value).into_owned())
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off", value),
        }),
    }
}

/// 命令行启动时读取的环境配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub quiet: bool,
    pub state_path: Option<String>,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,
            quiet: core::Quiet::get()?,
            state_path: i18n::StatePath::get().ok(),
        })
    }
}

/// 环境变量文档
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    for (name, description) in [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (core::Quiet::NAME, core::Quiet::DESCRIPTION),
        (i18n::StatePath::NAME, i18n::StatePath::DESCRIPTION),
    ] {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    docs.push_str("\nConfiguration fields can be overridden with `ISUKU__SECTION__FIELD`, e.g. `ISUKU__I18N__DEFAULT_LANGUAGE=fr`.\n");
    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert_eq!(core::LogLevel::parse("warn").unwrap(), "warn");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_boolean_parsing() {
        assert!(core::Quiet::parse("true").unwrap());
        assert!(core::Quiet::parse("1").unwrap());
        assert!(core::Quiet::parse("YES").unwrap());

        assert!(!core::Quiet::parse("off").unwrap());
        assert!(!core::Quiet::parse("").unwrap());

        assert!(core::Quiet::parse("maybe").is_err());
    }

    #[test]
    fn test_no_color_any_value() {
        assert!(core::NoColor::parse("0").unwrap());
        assert!(!core::NoColor::parse("").unwrap());
    }

    #[test]
    fn test_state_path() {
        assert!(i18n::StatePath::parse("  ").is_err());
        assert_eq!(
            i18n::StatePath::parse("/tmp/state.json").unwrap(),
            "/tmp/state.json"
        );

        env::set_var("ISUKU_STATE_PATH", "/tmp/isuku-env-test.json");
        let config = EnvConfig::from_env().unwrap();
        assert_eq!(config.state_path.as_deref(), Some("/tmp/isuku-env-test.json"));
        env::remove_var("ISUKU_STATE_PATH");
    }

    #[test]
    fn test_env_docs_list_every_variable() {
        let docs = generate_env_docs();
        for name in ["ISUKU_LOG_LEVEL", "NO_COLOR", "ISUKU_QUIET", "ISUKU_STATE_PATH"] {
            assert!(docs.contains(name));
        }
    }
}
