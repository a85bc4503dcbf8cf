//! 配置管理模块
//!
//! 配置来源按优先级从低到高叠加：内置默认值 → 配置文件 → `--config` 指定的文件
//! → `ISUKU__<SECTION>__<FIELD>` 环境变量。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::locale::Locale;
use crate::translation::store::LocaleStore;

/// 配置常量
pub mod constants {
    pub const CONFIG_PATHS: &[&str] = &[
        "isuku.toml",
        ".isuku.toml",
        "~/.config/isuku/config.toml",
        "/etc/isuku/config.toml",
    ];

    pub const ENV_PREFIX: &str = "ISUKU";

    // 与 Django 端共用的持久化名称
    pub const DEFAULT_COOKIE_NAME: &str = "django_language";
    pub const DEFAULT_STORAGE_KEY: &str = "preferredLanguage";
    pub const DEFAULT_COOKIE_MAX_AGE_DAYS: i64 = 365;

    pub const TRANSLATE_ATTR: &str = "data-translate";
    pub const PLACEHOLDER_ATTR: &str = "data-translate-placeholder";
    pub const ICON_TAGS: &[&str] = &["i"];
    /// 文本节点遍历时，短于该长度的旧文本会被清空
    pub const CLEAR_TEXT_MAX_CHARS: usize = 50;

    pub const DEFAULT_STATE_PATH: &str = "~/.config/isuku/browser-state.json";

    pub const DEFAULT_API_URL: &str = "http://localhost:8000";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IsukuConfig {
    pub i18n: I18nConfig,
    pub state: StateConfig,
    pub api: ApiConfig,
}

/// 翻译相关配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct I18nConfig {
    /// 基准语言
    pub default_language: String,
    pub cookie_name: String,
    pub storage_key: String,
    pub cookie_max_age_days: i64,
    /// 标记翻译键的属性
    pub translate_attr: String,
    /// 标记占位符翻译键的属性
    pub placeholder_attr: String,
    /// 视为图标的标签名
    pub icon_tags: Vec<String>,
    pub clear_text_max_chars: usize,
    /// 额外词典目录（`<code>.json`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_dir: Option<String>,
}

/// 浏览器状态文件
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StateConfig {
    pub path: String,
}

/// 位置服务接口
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_distance_km: f64,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: Locale::BASELINE.code().to_string(),
            cookie_name: constants::DEFAULT_COOKIE_NAME.to_string(),
            storage_key: constants::DEFAULT_STORAGE_KEY.to_string(),
            cookie_max_age_days: constants::DEFAULT_COOKIE_MAX_AGE_DAYS,
            translate_attr: constants::TRANSLATE_ATTR.to_string(),
            placeholder_attr: constants::PLACEHOLDER_ATTR.to_string(),
            icon_tags: constants::ICON_TAGS.iter().map(|tag| tag.to_string()).collect(),
            clear_text_max_chars: constants::CLEAR_TEXT_MAX_CHARS,
            dictionary_dir: None,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: constants::DEFAULT_STATE_PATH.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_API_URL.to_string(),
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            max_distance_km: constants::DEFAULT_MAX_DISTANCE_KM,
        }
    }
}

impl Default for IsukuConfig {
    fn default() -> Self {
        Self {
            i18n: I18nConfig::default(),
            state: StateConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl I18nConfig {
    /// 基准语言；配置值无效时退回英语
    pub fn baseline(&self) -> Locale {
        self.default_language.parse().unwrap_or(Locale::BASELINE)
    }
}

impl IsukuConfig {
    /// 加载配置，返回配置和实际使用的配置文件路径
    pub fn load(explicit_path: Option<&Path>) -> TranslationResult<(Self, Option<String>)> {
        Self::load_dotenv();

        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default())
                .map_err(|e| TranslationError::ConfigError(format!("默认配置错误: {}", e)))?,
        );

        let mut config_path = None;
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                builder = builder.add_source(File::with_name(&expanded_path));
                config_path = Some(expanded_path.to_string());
                tracing::info!("加载配置文件: {}", expanded_path);
                break;
            }
        }

        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(TranslationError::ConfigError(format!(
                    "配置文件不存在: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
            config_path = Some(path.display().to_string());
            tracing::info!("加载指定的配置文件: {}", path.display());
        }

        builder = builder.add_source(
            Environment::with_prefix(constants::ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: IsukuConfig = builder
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("构建配置失败: {}", e)))?
            .try_deserialize()
            .map_err(|e| TranslationError::ConfigError(format!("反序列化配置失败: {}", e)))?;

        config.validate()?;

        Ok((config, config_path))
    }

    /// 从 TOML 文本解析（缺省字段不补默认值）
    pub fn from_toml(source: &str) -> TranslationResult<Self> {
        let config: IsukuConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("未找到 .env 文件或加载失败: {}", e);
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        self.i18n
            .default_language
            .parse::<Locale>()
            .map_err(|_| {
                TranslationError::ConfigError(format!(
                    "未知的默认语言: {}",
                    self.i18n.default_language
                ))
            })?;

        if self.i18n.translate_attr.trim().is_empty()
            || self.i18n.placeholder_attr.trim().is_empty()
        {
            return Err(TranslationError::ConfigError(
                "翻译属性名不能为空".to_string(),
            ));
        }

        if self.i18n.cookie_name.trim().is_empty() || self.i18n.storage_key.trim().is_empty() {
            return Err(TranslationError::ConfigError(
                "cookie 名称和存储键不能为空".to_string(),
            ));
        }

        if self.i18n.cookie_max_age_days <= 0 {
            return Err(TranslationError::ConfigError(
                "cookie 有效期必须大于0天".to_string(),
            ));
        }

        let url = Url::parse(&self.api.base_url).map_err(|e| {
            TranslationError::ConfigError(format!("API 地址无效 {}: {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::ConfigError(
                "API 地址必须以 http:// 或 https:// 开头".to_string(),
            ));
        }

        Ok(())
    }

    /// 展开后的状态文件路径
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state.path).as_ref())
    }

    /// 按配置构建词典集合
    pub fn load_store(&self) -> TranslationResult<Arc<LocaleStore>> {
        let builtin = LocaleStore::builtin();
        let baseline = self.i18n.baseline();

        match &self.i18n.dictionary_dir {
            None if baseline == builtin.baseline() => Ok(builtin),
            None => Ok(Arc::new((*builtin).clone().with_baseline(baseline))),
            Some(dir) => {
                let dir = PathBuf::from(shellexpand::tilde(dir).as_ref());
                let store = (*builtin)
                    .clone()
                    .with_baseline(baseline)
                    .with_overrides_dir(&dir)?;
                Ok(Arc::new(store))
            }
        }
    }
}
