//! 文本处理管道
//!
//! - `collector`: 从DOM中找出带翻译键的元素
//! - `applier`: 按元素类型写入译文
//! - `merge`: 混合内容（图标、换行）的文本替换策略

pub mod applier;
pub mod collector;
pub mod merge;

pub use applier::{ApplyOutcome, ApplyReport, DomApplier};
pub use collector::{Binding, BindingCollector};
pub use merge::{MergeMode, MergeStrategy};
