//! 绑定收集器
//!
//! 按文档顺序找出所有带翻译键属性的元素。调用方也可以跳过收集，
//! 直接构造 `Binding` 列表交给应用器。

use markup5ever_rcdom::Handle;

use crate::parsers::html::{get_node_attr, is_element};
use crate::translation::config::I18nConfig;

/// 元素与翻译键的绑定
#[derive(Debug, Clone)]
pub struct Binding {
    /// DOM节点引用
    pub element: Handle,
    /// 主翻译键（替换文本、按钮值或选项文本）
    pub key: Option<String>,
    /// 占位符翻译键
    pub placeholder_key: Option<String>,
}

impl Binding {
    /// 主翻译键绑定
    pub fn new(element: Handle, key: impl Into<String>) -> Self {
        Self {
            element,
            key: Some(key.into()),
            placeholder_key: None,
        }
    }

    /// 占位符绑定
    pub fn placeholder(element: Handle, key: impl Into<String>) -> Self {
        Self {
            element,
            key: None,
            placeholder_key: Some(key.into()),
        }
    }
}

/// 收集器
#[derive(Debug, Clone)]
pub struct BindingCollector {
    translate_attr: String,
    placeholder_attr: String,
}

impl Default for BindingCollector {
    fn default() -> Self {
        Self::from_config(&I18nConfig::default())
    }
}

impl BindingCollector {
    pub fn from_config(config: &I18nConfig) -> Self {
        Self {
            translate_attr: config.translate_attr.clone(),
            placeholder_attr: config.placeholder_attr.clone(),
        }
    }

    /// 收集 `root` 之下（含自身）的全部绑定
    pub fn collect(&self, root: &Handle) -> Vec<Binding> {
        let mut bindings = Vec::new();
        self.collect_into(root, &mut bindings);

        tracing::debug!("找到 {} 个可翻译元素", bindings.len());
        bindings
    }

    fn collect_into(&self, node: &Handle, bindings: &mut Vec<Binding>) {
        if is_element(node) {
            let key = get_node_attr(node, &self.translate_attr);
            let placeholder_key = get_node_attr(node, &self.placeholder_attr);

            if key.is_some() || placeholder_key.is_some() {
                bindings.push(Binding {
                    element: node.clone(),
                    key,
                    placeholder_key,
                });
            }
        }

        for child in node.children.borrow().iter() {
            self.collect_into(child, bindings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{get_node_name, html_to_dom};

    #[test]
    fn collects_in_document_order() {
        let dom = html_to_dom(
            br#"<nav><a data-translate="HOME">HOME</a>
                <h1 data-translate="X"><span data-translate="SYSTEM">SYSTEM</span></h1>
                <input data-translate-placeholder="password" placeholder="password">
                <p>untagged</p></nav>"#,
            "utf-8",
        )
        .unwrap();

        let bindings = BindingCollector::default().collect(&dom.document);
        let summary: Vec<_> = bindings
            .iter()
            .map(|b| {
                (
                    get_node_name(&b.element).unwrap().to_string(),
                    b.key.clone(),
                    b.placeholder_key.clone(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("a".to_string(), Some("HOME".to_string()), None),
                ("h1".to_string(), Some("X".to_string()), None),
                ("span".to_string(), Some("SYSTEM".to_string()), None),
                ("input".to_string(), None, Some("password".to_string())),
            ]
        );
    }

    #[test]
    fn honours_configured_attribute_names() {
        let dom = html_to_dom(br#"<a data-i18n="HOME">HOME</a><b data-translate="X">X</b>"#, "utf-8")
            .unwrap();

        let config = I18nConfig {
            translate_attr: "data-i18n".to_string(),
            ..I18nConfig::default()
        };
        let bindings = BindingCollector::from_config(&config).collect(&dom.document);

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].key.as_deref(), Some("HOME"));
    }
}
