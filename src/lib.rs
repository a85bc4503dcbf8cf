//! # Isuku i18n
//!
//! Isuku 网站的页面翻译引擎：根据保存的语言偏好，把带 `data-translate`
//! 标记的元素替换为对应语言的文本，并提供地图位置相关接口的客户端。
//!
//! ## 模块组织
//!
//! - `core` - 文档处理流程（解码、翻译、序列化）
//! - `env` - 环境变量
//! - `parsers` - HTML 解析和DOM操作
//! - `translation` - 词典、语言偏好、DOM应用器和翻译会话
//! - `network` - 位置服务

pub mod core;
pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use core::*;
pub use parsers::*;
pub use translation::{
    I18nConfig, IsukuConfig, Locale, LocaleStore, TranslationError, TranslationResult,
    TranslationSession,
};
