//! 人工输入接口
//!
//! 答案解析器在 AI 无法回答时通过它把问题交给用户，并挂起直到用户回复。
//! 等待期间收到停止命令时返回 [`crate::error::AppError::Stopped`]。

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 用户对问题的回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HumanReply {
    Answer(String),
    Skip,
}

/// 用户对生成的求职信的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Regenerate,
    Skip,
}

#[async_trait]
pub trait HumanInput: Send + Sync {
    /// 提出问题并等待回答或跳过
    async fn ask(&self, question: &str, reason: &str) -> Result<HumanReply>;

    /// 展示求职信草稿并等待确认
    async fn review_cover_letter(&self, draft: &str) -> Result<ReviewDecision>;
}
