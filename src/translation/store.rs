//! 词典存储
//!
//! 每种语言一张扁平的 键→文本 表。查找顺序固定：
//! 当前语言 → 基准语言 → 键本身。缺失的翻译只会显示成原始键，不会报错。

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::locale::Locale;

const BUILTIN_EN: &str = include_str!("../../locales/en.json");
const BUILTIN_RW: &str = include_str!("../../locales/rw.json");
const BUILTIN_FR: &str = include_str!("../../locales/fr.json");

/// 单一语言的词典
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象解析词典
    pub fn from_json(source: &str) -> TranslationResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(source)?;
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 用另一张表覆盖同名词条
    pub fn merge(&mut self, other: Dictionary) {
        self.entries.extend(other.entries);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// 所有语言的词典集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleStore {
    dictionaries: HashMap<Locale, Dictionary>,
    baseline: Locale,
}

impl LocaleStore {
    /// 内置的 en / rw / fr 词典，进程内只解析一次
    pub fn builtin() -> Arc<LocaleStore> {
        static BUILTIN: OnceLock<Arc<LocaleStore>> = OnceLock::new();

        BUILTIN
            .get_or_init(|| {
                let mut dictionaries = HashMap::new();

                for (locale, source) in [
                    (Locale::En, BUILTIN_EN),
                    (Locale::Rw, BUILTIN_RW),
                    (Locale::Fr, BUILTIN_FR),
                ] {
                    let dictionary = Dictionary::from_json(source).unwrap_or_else(|e| {
                        tracing::error!("内置词典 {} 解析失败: {}", locale, e);
                        Dictionary::new()
                    });
                    dictionaries.insert(locale, dictionary);
                }

                Arc::new(LocaleStore {
                    dictionaries,
                    baseline: Locale::BASELINE,
                })
            })
            .clone()
    }

    /// 用调用方提供的表构建词典集合
    pub fn from_tables<I, D>(baseline: Locale, tables: I) -> Self
    where
        I: IntoIterator<Item = (Locale, D)>,
        D: Into<Dictionary>,
    {
        Self {
            dictionaries: tables
                .into_iter()
                .map(|(locale, table)| (locale, table.into()))
                .collect(),
            baseline,
        }
    }

    /// 更换基准语言
    pub fn with_baseline(mut self, baseline: Locale) -> Self {
        self.baseline = baseline;
        self
    }

    /// 从目录中读取 `<code>.json` 并覆盖同名词条
    ///
    /// 目录中没有对应文件的语言保持不变。
    pub fn with_overrides_dir(mut self, dir: &Path) -> TranslationResult<Self> {
        if !dir.is_dir() {
            return Err(TranslationError::ConfigError(format!(
                "词典目录不存在: {}",
                dir.display()
            )));
        }

        for locale in Locale::ALL {
            let path = dir.join(format!("{}.json", locale.code()));
            if !path.exists() {
                continue;
            }

            let source = fs::read_to_string(&path)
                .map_err(|e| TranslationError::from(e).with_context(path.display()))?;
            let overrides = Dictionary::from_json(&source)
                .map_err(|e| e.with_context(path.display()))?;

            tracing::info!("加载词典覆盖文件: {} ({} 条)", path.display(), overrides.len());

            self.dictionaries
                .entry(locale)
                .or_default()
                .merge(overrides);
        }

        Ok(self)
    }

    pub fn baseline(&self) -> Locale {
        self.baseline
    }

    /// 该语言是否配置了词典（哪怕只有部分词条）
    pub fn has_dictionary(&self, locale: Locale) -> bool {
        self.dictionaries.contains_key(&locale)
    }

    /// 已配置词典的语言
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.dictionaries.keys().copied().collect();
        locales.sort();
        locales
    }

    pub fn dictionary(&self, locale: Locale) -> Option<&Dictionary> {
        self.dictionaries.get(&locale)
    }

    /// 查找词条，当前语言和基准语言都没有时返回 `None`
    ///
    /// 空字符串的词条视为缺失。
    pub fn lookup_entry(&self, locale: Locale, key: &str) -> Option<&str> {
        self.entry(locale, key).or_else(|| self.entry(self.baseline, key))
    }

    fn entry(&self, locale: Locale, key: &str) -> Option<&str> {
        self.dictionaries
            .get(&locale)
            .and_then(|dictionary| dictionary.get(key))
            .filter(|translation| !translation.is_empty())
    }

    /// 查找翻译，两级都缺失时原样返回键
    pub fn lookup(&self, locale: Locale, key: &str) -> String {
        self.lookup_entry(locale, key).unwrap_or(key).to_string()
    }
}

impl From<HashMap<String, String>> for Dictionary {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Dictionary {
    fn from(entries: [(&str, &str); N]) -> Self {
        entries.into_iter().collect()
    }
}
