//! 字段标注服务 - 业务能力层
//!
//! 只负责"从表单元素得出问题文字"，没有副作用

use crate::models::FieldElement;

/// 字段标注
///
/// 解析顺序：
/// 1. 最近的表单分组中可见的 label
/// 2. `aria-label`
/// 3. placeholder
/// 4. 成组选择元素（单选 / 复选）的 legend
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldLabeler;

impl FieldLabeler {
    pub fn new() -> Self {
        Self
    }

    /// 返回 `None` 表示无法识别该字段，调用方应跳过
    pub fn label(&self, element: &FieldElement) -> Option<String> {
        let grouped = element.kind.is_some_and(|k| k.is_grouped_choice());

        [
            element.group_label.as_deref(),
            element.aria_label.as_deref(),
            element.placeholder.as_deref(),
            element.legend.as_deref().filter(|_| grouped),
        ]
        .into_iter()
        .flatten()
        .map(normalize)
        .find(|text| !text.is_empty())
    }
}

/// 合并空白，去掉必填标记
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('*')
        .trim()
        .to_string()
}
