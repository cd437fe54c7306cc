use serde::{Deserialize, Serialize};

use super::posting::ApplicationOutcome;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Paused,
    AwaitingInput,
}

/// 一次会话的运行状态，只由 SessionController 修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub status: RunStatus,
    pub applied_count: u32,
    pub skipped_count: u32,
    pub failed_count: u32,
    pub pending_question: Option<String>,
}

impl RunState {
    pub fn visited(&self) -> u32 {
        self.applied_count + self.skipped_count + self.failed_count
    }
}

/// 跨会话累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl Stats {
    pub fn record(&mut self, outcome: &ApplicationOutcome) {
        match outcome {
            ApplicationOutcome::Applied => self.applied += 1,
            ApplicationOutcome::Skipped(_) => self.skipped += 1,
            ApplicationOutcome::Failed(_) => self.failed += 1,
        }
    }
}
