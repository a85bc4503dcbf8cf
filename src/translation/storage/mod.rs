//! 浏览器本地状态
//!
//! - `cookie`: cookie 集合
//! - `local`: localStorage
//!
//! `BrowserState` 把两者放在一起，命令行模式下保存为 JSON 文件。

pub mod cookie;
pub mod local;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

pub use cookie::{Cookie, CookieJar};
pub use local::{LocalStorage, MemoryStorage};

/// 一个页面会话可见的持久化状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserState {
    #[serde(default)]
    pub cookies: CookieJar,
    #[serde(default)]
    pub local_storage: MemoryStorage,
}

impl BrowserState {
    pub fn new(cookies: CookieJar, local_storage: MemoryStorage) -> Self {
        Self {
            cookies,
            local_storage,
        }
    }

    /// 读取状态文件，文件不存在时返回空状态
    pub fn load(path: &Path) -> TranslationResult<Self> {
        if !path.exists() {
            tracing::debug!("状态文件不存在，使用空状态: {}", path.display());
            return Ok(Self::default());
        }

        let source = fs::read_to_string(path)
            .map_err(|e| TranslationError::from(e).with_context(path.display()))?;
        serde_json::from_str(&source)
            .map_err(|e| TranslationError::from(e).with_context(path.display()))
    }

    /// 写回状态文件，必要时创建父目录
    pub fn save(&self, path: &Path) -> TranslationResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| TranslationError::from(e).with_context(path.display()))
    }
}
