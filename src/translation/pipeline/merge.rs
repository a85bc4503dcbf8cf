//! 文本合并策略
//!
//! 替换元素中的可读文本，同时保留图标和换行等结构。判断顺序固定：
//! 图标 → `<br>` → 整体替换。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    count_descendants_by_name, create_element, create_text, get_node_name, replace_children,
    set_text_content, set_text_node, text_content,
};
use crate::translation::config::I18nConfig;

/// 文本遍历时跳过的子树
const SKIP_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// 实际采用的替换方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// 元素已显示该译文，未做修改
    Unchanged,
    /// 图标 + 空格 + 译文
    IconsBefore,
    /// 译文 + 空格 + 图标
    IconsAfter,
    /// 图标夹在文本中间，只替换文本节点
    TextNodesOnly,
    /// 译文自带换行，按行插入 `<br>`
    LineBreaks,
    /// 键的换行数与 `<br>` 数一致，按同样的分隔符拆分译文
    SplitLines,
    /// 整体替换文本内容
    Atomic,
}

/// 图标相对文本的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IconLayout {
    Before,
    After,
    Interleaved,
}

/// 合并策略
#[derive(Debug, Clone)]
pub struct MergeStrategy {
    icon_tags: Vec<String>,
    clear_text_max_chars: usize,
}

impl Default for MergeStrategy {
    fn default() -> Self {
        Self::from_config(&I18nConfig::default())
    }
}

impl MergeStrategy {
    pub fn from_config(config: &I18nConfig) -> Self {
        Self {
            icon_tags: config.icon_tags.clone(),
            clear_text_max_chars: config.clear_text_max_chars,
        }
    }

    fn is_icon(&self, node: &Handle) -> bool {
        get_node_name(node).map_or(false, |name| {
            self.icon_tags.iter().any(|icon| icon.eq_ignore_ascii_case(name))
        })
    }

    /// 把译文写入元素
    pub fn apply(&self, element: &Handle, key: &str, translation: &str) -> MergeMode {
        // 元素已显示该译文（含基准语言下译文等于原文）时保持 DOM 不变
        if normalize(&visible_text(element)) == normalize(translation) {
            return MergeMode::Unchanged;
        }

        if let Some(layout) = self.icon_layout(element) {
            return match layout {
                IconLayout::Before => {
                    let mut children = self.icon_children(element);
                    children.push(create_text(&format!(" {}", translation)));
                    replace_children(element, children);
                    MergeMode::IconsBefore
                }
                IconLayout::After => {
                    let mut children = vec![create_text(&format!("{} ", translation))];
                    children.extend(self.icon_children(element));
                    replace_children(element, children);
                    MergeMode::IconsAfter
                }
                IconLayout::Interleaved => self.replace_text_nodes_only(element, translation),
            };
        }

        let br_count = count_descendants_by_name(element, "br");
        if br_count > 0 {
            if translation.contains('\n') {
                render_lines(element, translation);
                return MergeMode::LineBreaks;
            }

            if key.matches('\n').count() == br_count {
                render_lines(element, translation);
                return MergeMode::SplitLines;
            }
        }

        set_text_content(element, translation);
        MergeMode::Atomic
    }

    /// 判断直接子节点中图标与文本的相对位置；没有图标时返回 `None`
    fn icon_layout(&self, element: &Handle) -> Option<IconLayout> {
        let mut icon_positions = Vec::new();
        let mut text_positions = Vec::new();

        for (index, child) in element.children.borrow().iter().enumerate() {
            if self.is_icon(child) {
                icon_positions.push(index);
            } else if !text_content(child).trim().is_empty() {
                text_positions.push(index);
            }
        }

        let (first_icon, last_icon) = (icon_positions.first()?, icon_positions.last()?);

        match (text_positions.first(), text_positions.last()) {
            (Some(first_text), _) if last_icon < first_text => Some(IconLayout::Before),
            (_, Some(last_text)) if first_icon > last_text => Some(IconLayout::After),
            (None, None) => Some(IconLayout::Before),
            _ => Some(IconLayout::Interleaved),
        }
    }

    /// 原有的图标节点，以单个空格分隔
    fn icon_children(&self, element: &Handle) -> Vec<Handle> {
        let icons: Vec<Handle> = element
            .children
            .borrow()
            .iter()
            .filter(|child| self.is_icon(child))
            .cloned()
            .collect();

        let mut children = Vec::with_capacity(icons.len() * 2);
        for (index, icon) in icons.into_iter().enumerate() {
            if index > 0 {
                children.push(create_text(" "));
            }
            children.push(icon);
        }
        children
    }

    /// 只替换文本节点：第一个非空文本节点写入完整译文，
    /// 其余较短的旧文本清空，所有元素节点原样保留
    fn replace_text_nodes_only(&self, element: &Handle, translation: &str) -> MergeMode {
        let mut text_nodes = Vec::new();
        self.collect_text_nodes(element, &mut text_nodes);

        let Some((first, rest)) = text_nodes.split_first() else {
            set_text_content(element, translation);
            return MergeMode::Atomic;
        };

        set_text_node(first, translation);

        for node in rest {
            let length = text_content(node).trim().chars().count();
            if length > 0 && length < self.clear_text_max_chars {
                set_text_node(node, "");
            }
        }

        MergeMode::TextNodesOnly
    }

    fn collect_text_nodes(&self, node: &Handle, out: &mut Vec<Handle>) {
        for child in node.children.borrow().iter() {
            match &child.data {
                NodeData::Text { contents } => {
                    if !contents.borrow().trim().is_empty() {
                        out.push(child.clone());
                    }
                }
                NodeData::Element { .. } => {
                    let skipped = self.is_icon(child)
                        || get_node_name(child)
                            .map_or(false, |name| SKIP_TEXT_ELEMENTS.contains(&name));
                    if !skipped {
                        self.collect_text_nodes(child, out);
                    }
                }
                _ => {}
            }
        }
    }
}

/// 每个 `\n` 对应一个 `<br>`
fn render_lines(element: &Handle, translation: &str) {
    let mut children = Vec::new();
    for (index, line) in translation.split('\n').enumerate() {
        if index > 0 {
            children.push(create_element("br"));
        }
        if !line.is_empty() {
            children.push(create_text(line));
        }
    }
    replace_children(element, children);
}

/// 元素显示的文本，`<br>` 视为换行
fn visible_text(node: &Handle) -> String {
    let mut text = String::new();
    collect_visible_text(node, &mut text);
    text
}

fn collect_visible_text(node: &Handle, out: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } if get_node_name(child) == Some("br") => out.push('\n'),
            NodeData::Element { .. } => collect_visible_text(child, out),
            _ => {}
        }
    }
}

/// 比较用：换行和连续空白都压缩为单个空格
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
