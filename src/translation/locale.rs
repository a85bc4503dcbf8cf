//! 语言代码
//!
//! 站点只支持固定的三种语言，基准语言为英语。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::translation::error::TranslationError;

/// 语言代码（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    En,
    /// Kinyarwanda
    Rw,
    /// Français
    Fr,
}

impl Locale {
    /// 基准语言：查找缺失时的回退目标
    pub const BASELINE: Locale = Locale::En;

    /// 所有已知语言，按站点菜单顺序排列
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Rw, Locale::Fr];

    /// 语言代码，同时用于 cookie、localStorage 和 `<html lang>`
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Rw => "rw",
            Locale::Fr => "fr",
        }
    }

    /// 语言的本地名称
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Rw => "Kinyarwanda",
            Locale::Fr => "Français",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::BASELINE
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = TranslationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "en" => Ok(Locale::En),
            "rw" => Ok(Locale::Rw),
            "fr" => Ok(Locale::Fr),
            other => Err(TranslationError::UnsupportedLanguage(other.to_string())),
        }
    }
}
