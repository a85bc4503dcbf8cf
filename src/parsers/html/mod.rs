//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、属性、文本节点、子节点替换）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    append_child, count_descendants_by_name, create_element, create_text, find_nodes,
    get_charset, get_child_node_by_name, get_node_attr, get_node_name, has_descendant_with_attr,
    html_to_dom, inner_html, is_element, replace_children, set_node_attr, set_text_content,
    set_text_node, text_content,
};
pub use serializer::serialize_document;
