//! 翻译模块
//!
//! 页面内的多语言切换：
//! - **store**: 内置词典和基准语言回退
//! - **preference**: 从 cookie / localStorage 解析当前语言
//! - **pipeline**: 收集翻译绑定并写入DOM
//! - **session**: 一次页面生命周期内的语言状态
//! - **storage**: cookie 和 localStorage
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust
//! use isuku_i18n::parsers::html_to_dom;
//! use isuku_i18n::translation::{I18nConfig, LocaleStore, TranslationSession};
//!
//! let dom = html_to_dom(br#"<a data-translate="HOME">HOME</a>"#, "utf-8").unwrap();
//! let mut session = TranslationSession::start(
//!     dom,
//!     LocaleStore::builtin(),
//!     Default::default(),
//!     &I18nConfig::default(),
//! );
//! session.set_language("fr").unwrap();
//! assert_eq!(session.translate("HOME"), "ACCUEIL");
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 配置文件、环境变量和默认值
pub mod config;

/// 错误处理模块 - 统一的错误类型
pub mod error;

/// 支持的语言
pub mod locale;

/// DOM 应用管道 - 收集绑定、按元素类型写入译文
pub mod pipeline;

/// 语言偏好解析
pub mod preference;

/// 翻译会话
pub mod session;

/// 浏览器状态 - cookie 和 localStorage
pub mod storage;

/// 词典存储
pub mod store;

// ============================================================================
// 核心API导出
// ============================================================================

pub use config::{constants, ApiConfig, I18nConfig, IsukuConfig, StateConfig};
pub use error::{TranslationError, TranslationResult};
pub use locale::Locale;
pub use pipeline::{
    ApplyOutcome, ApplyReport, Binding, BindingCollector, DomApplier, MergeMode, MergeStrategy,
};
pub use preference::PreferenceResolver;
pub use session::TranslationSession;
pub use storage::{BrowserState, Cookie, CookieJar, LocalStorage, MemoryStorage};
pub use store::{Dictionary, LocaleStore};

// ============================================================================
// 便利函数
// ============================================================================

/// 使用内置词典翻译单个键
///
/// 语言代码无效时按基准语言处理；所有词典都没有该键时返回键本身。
///
/// # Examples
///
/// ```rust
/// use isuku_i18n::translation::translate_key;
///
/// assert_eq!(translate_key("rw", "HOME"), "AYANZU");
/// assert_eq!(translate_key("xx", "HOME"), "HOME");
/// assert_eq!(translate_key("fr", "No such key"), "No such key");
/// ```
pub fn translate_key(code: &str, key: &str) -> String {
    let store = LocaleStore::builtin();
    let locale = code.parse().unwrap_or_else(|_| store.baseline());
    store.lookup(locale, key)
}

/// 内置支持的语言列表（代码、本地名称）
pub fn supported_languages() -> Vec<(&'static str, &'static str)> {
    LocaleStore::builtin()
        .locales()
        .into_iter()
        .map(|locale| (locale.code(), locale.native_name()))
        .collect()
}
