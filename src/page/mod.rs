//! 页面访问层
//!
//! 只按语义角色暴露页面能力（职位列表、描述、表单字段、按钮），
//! 具体选择器是实现细节，流程层不认识 DOM。

pub mod chrome;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FieldElement, FieldWrite, Posting, SearchFilters};

pub use chrome::ChromeJobPage;

/// 申请弹窗中的按钮角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    /// 提交申请
    Submit,
    /// Next / Continue / Review
    Next,
    /// 提交后的完成确认
    Done,
    /// 关闭弹窗
    Dismiss,
    /// 关闭时的放弃确认
    Discard,
}

/// 职位搜索页的能力
#[async_trait]
pub trait JobPage: Send + Sync {
    /// 当前页面是否是可用的职位搜索页
    async fn is_job_search_page(&self) -> Result<bool>;

    /// 在当前标签页打开地址
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 在结果页上应用筛选条件
    async fn apply_filters(&self, filters: &SearchFilters) -> Result<()>;

    /// 当前结果页的职位列表（按页面顺序，描述为空）
    async fn list_postings(&self) -> Result<Vec<Posting>>;

    /// 打开职位详情
    async fn open_posting(&self, posting_id: &str) -> Result<()>;

    /// 已打开职位的描述文本
    async fn description_text(&self) -> Result<String>;

    /// 是否存在 Easy Apply 入口
    async fn has_easy_apply(&self) -> Result<bool>;

    /// 点击 Easy Apply 打开申请弹窗
    async fn open_easy_apply(&self) -> Result<()>;

    /// 申请弹窗是否仍然打开
    async fn modal_open(&self) -> Result<bool>;

    /// 当前步骤中可填写的字段
    async fn visible_fields(&self) -> Result<Vec<FieldElement>>;

    /// 写入字段
    async fn write_field(&self, field_id: &str, write: &FieldWrite) -> Result<()>;

    /// 查找指定角色的按钮
    async fn has_control(&self, role: ControlRole) -> Result<bool>;

    /// 点击指定角色的按钮
    async fn click_control(&self, role: ControlRole) -> Result<()>;

    /// 翻到下一页结果，没有下一页时返回 false
    async fn next_results_page(&self) -> Result<bool>;
}
