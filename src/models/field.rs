use serde::{Deserialize, Serialize};

/// 表单元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    TextArea,
    Select,
    Radio,
    Checkbox,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::TextArea => "textarea",
            ElementKind::Select => "select",
            ElementKind::Radio => "radio",
            ElementKind::Checkbox => "checkbox",
        }
    }

    /// 单选组 / 复选框这类成组选择的元素
    pub fn is_grouped_choice(self) -> bool {
        matches!(self, ElementKind::Radio | ElementKind::Checkbox)
    }
}

/// 页面层给出的表单元素快照
///
/// `id` 是页面层分配的句柄，写回时原样传回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldElement {
    pub id: String,
    pub kind: Option<ElementKind>,
    pub group_label: Option<String>,
    pub aria_label: Option<String>,
    pub placeholder: Option<String>,
    pub legend: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub has_value: bool,
}

/// 每一步每个字段的上下文，步骤结束后丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub label: String,
    pub element_kind: ElementKind,
    pub options: Vec<String>,
    pub already_has_value: bool,
}

/// 答案解析结果，不会被部分应用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Answer(String),
    NeedHumanInput(String),
    Unresolved,
}

/// 写入字段的方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldWrite {
    /// 文本类：直接设置值
    SetText(String),
    /// 下拉框：按选项文字选中
    SelectOption(String),
    /// 单选组：点击对应选项
    ChooseRadio(String),
    /// 复选框：勾选
    Check,
}

impl FieldWrite {
    /// 写入的值，勾选复选框时没有值
    pub fn value(&self) -> Option<&str> {
        match self {
            FieldWrite::SetText(v) | FieldWrite::SelectOption(v) | FieldWrite::ChooseRadio(v) => {
                Some(v)
            }
            FieldWrite::Check => None,
        }
    }
}
