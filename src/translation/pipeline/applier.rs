//! DOM 应用器
//!
//! 对每个绑定按固定优先级处理：占位符 → 按钮值 → 空值选项 →
//! 嵌套翻译子元素（跳过） → 文本合并策略。可重复调用，结果一致。

use markup5ever_rcdom::Handle;

use crate::parsers::html::{
    get_node_attr, get_node_name, has_descendant_with_attr, set_node_attr, set_text_content,
    text_content,
};
use crate::translation::config::I18nConfig;
use crate::translation::locale::Locale;
use crate::translation::pipeline::collector::Binding;
use crate::translation::pipeline::merge::{MergeMode, MergeStrategy};
use crate::translation::store::LocaleStore;

/// 单个绑定的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 写入了 `placeholder` 属性
    Placeholder,
    /// 写入了按钮的 `value`
    Value,
    /// 写入了空值选项的文本
    OptionText,
    /// 子元素自带翻译键，父元素不处理
    NestedSkipped,
    /// 交给合并策略处理
    Merged(MergeMode),
    /// 元素类型不需要处理（其他输入框、非空选项等）
    Untouched,
    /// 所有词典都没有该键，保留原文
    Missing,
    /// 绑定的键为空
    EmptyKey,
}

impl ApplyOutcome {
    fn is_translated(self) -> bool {
        matches!(
            self,
            ApplyOutcome::Placeholder
                | ApplyOutcome::Value
                | ApplyOutcome::OptionText
                | ApplyOutcome::Merged(_)
        )
    }
}

/// 一次应用的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub translated: usize,
    pub skipped: usize,
    pub missing: usize,
}

impl ApplyReport {
    fn record(&mut self, outcome: ApplyOutcome) {
        match outcome {
            ApplyOutcome::Missing => self.missing += 1,
            outcome if outcome.is_translated() => self.translated += 1,
            _ => self.skipped += 1,
        }
    }
}

/// 应用器
#[derive(Debug, Clone)]
pub struct DomApplier {
    translate_attr: String,
    merge: MergeStrategy,
}

impl Default for DomApplier {
    fn default() -> Self {
        Self::from_config(&I18nConfig::default())
    }
}

impl DomApplier {
    pub fn from_config(config: &I18nConfig) -> Self {
        Self {
            translate_attr: config.translate_attr.clone(),
            merge: MergeStrategy::from_config(config),
        }
    }

    /// 把 `locale` 的译文应用到所有绑定
    pub fn apply_all(&self, store: &LocaleStore, locale: Locale, bindings: &[Binding]) -> ApplyReport {
        tracing::debug!("应用翻译: {} ({} 个元素)", locale, bindings.len());

        let mut report = ApplyReport::default();
        for binding in bindings {
            report.record(self.apply_binding(store, locale, binding));
        }

        tracing::debug!(
            "翻译完成: 已翻译 {}, 跳过 {}, 缺失 {}",
            report.translated,
            report.skipped,
            report.missing
        );
        report
    }

    /// 处理单个绑定
    pub fn apply_binding(&self, store: &LocaleStore, locale: Locale, binding: &Binding) -> ApplyOutcome {
        let element = &binding.element;

        if let Some(placeholder_key) = binding.placeholder_key.as_deref() {
            if placeholder_key.is_empty() {
                return ApplyOutcome::EmptyKey;
            }
            return match store.lookup_entry(locale, placeholder_key) {
                Some(translation) => {
                    set_node_attr(element, "placeholder", Some(translation.to_string()));
                    ApplyOutcome::Placeholder
                }
                None => ApplyOutcome::Missing,
            };
        }

        let key = match binding.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return ApplyOutcome::EmptyKey,
        };

        let Some(translation) = store.lookup_entry(locale, key) else {
            tracing::trace!("缺少翻译: {}", key);
            return ApplyOutcome::Missing;
        };

        match get_node_name(element) {
            Some("input") => {
                if is_button_input(element) {
                    set_node_attr(element, "value", Some(translation.to_string()));
                    ApplyOutcome::Value
                } else {
                    ApplyOutcome::Untouched
                }
            }
            Some("textarea") => ApplyOutcome::Untouched,
            Some("option") => {
                if option_value_is_empty(element) {
                    // 没有 value 属性时值取自文本，写入译文前固定为空值
                    if get_node_attr(element, "value").is_none() {
                        set_node_attr(element, "value", Some(String::new()));
                    }
                    set_text_content(element, translation);
                    ApplyOutcome::OptionText
                } else {
                    ApplyOutcome::Untouched
                }
            }
            _ if has_descendant_with_attr(element, &self.translate_attr) => {
                ApplyOutcome::NestedSkipped
            }
            _ => ApplyOutcome::Merged(self.merge.apply(element, key, translation)),
        }
    }
}

fn is_button_input(element: &Handle) -> bool {
    get_node_attr(element, "type").map_or(false, |input_type| {
        input_type.eq_ignore_ascii_case("submit") || input_type.eq_ignore_ascii_case("button")
    })
}

/// 选项的实际值：有 `value` 属性时取属性，否则取去掉首尾空白的文本
fn option_value_is_empty(element: &Handle) -> bool {
    match get_node_attr(element, "value") {
        Some(value) => value.is_empty(),
        None => text_content(element).trim().is_empty(),
    }
}
