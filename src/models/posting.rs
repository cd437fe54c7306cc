use std::fmt;

use serde::{Deserialize, Serialize};

/// 职位快照
///
/// 在处理时读取一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description_text: String,
    pub already_applied: bool,
}

impl Posting {
    /// 打开详情后，带上描述生成新的快照
    pub fn with_description(self, description_text: String) -> Self {
        Self {
            description_text,
            ..self
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.title, self.company)
    }
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    AlreadyApplied,
    Excluded,
    ExperienceTooHigh { required: u32, max: u32 },
    NoEasyApply,
    LowMatchScore { score: u8, min: u8 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyApplied => write!(f, "already applied"),
            SkipReason::Excluded => write!(f, "excluded"),
            SkipReason::ExperienceTooHigh { required, max } => {
                write!(f, "experience too high ({}+ > {})", required, max)
            }
            SkipReason::NoEasyApply => write!(f, "no easy apply"),
            SkipReason::LowMatchScore { score, min } => {
                write!(f, "low match score ({} < {})", score, min)
            }
        }
    }
}

/// 单个职位的最终结果，每个职位只上报一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum ApplicationOutcome {
    Applied,
    Skipped(SkipReason),
    Failed(String),
}

impl fmt::Display for ApplicationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationOutcome::Applied => write!(f, "applied"),
            ApplicationOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            ApplicationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
