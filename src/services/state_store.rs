//! 持久化状态 - 业务能力层
//!
//! 所有持久化数据放在同一个 JSON 命名空间 `autoApply` 下：
//! 设置、累计统计、最近 100 条日志、最近 1000 条已申请记录。
//! 启动时读取，每次修改后整体写回。

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppResult, StoreError};
use crate::models::{ApplicationOutcome, Posting, Settings, Stats};

/// 日志缓冲上限
pub const MAX_LOG_ENTRIES: usize = 100;

/// 已申请记录上限，超出时丢弃最旧的
pub const MAX_APPLIED_HISTORY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

/// 已申请记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub applied_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub settings: Option<Settings>,
    pub stats: Stats,
    pub logs: VecDeque<LogEntry>,
    pub applied_history: Vec<AppliedRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(rename = "autoApply", default)]
    auto_apply: PersistedState,
}

/// 状态存储
///
/// `path` 为 `None` 时只保存在内存中
#[derive(Debug, Default)]
pub struct StateStore {
    path: Option<PathBuf>,
    state: Mutex<PersistedState>,
}

impl StateStore {
    /// 从文件加载，文件不存在时从空状态开始
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StoreError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
            let file: StateFile =
                serde_json::from_str(&content).map_err(|e| StoreError::ParseFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            info!(
                "✓ 已加载持久化状态: {} (累计申请 {})",
                path.display(),
                file.auto_apply.stats.applied
            );
            file.auto_apply
        } else {
            debug!("状态文件 {} 不存在，使用空状态", path.display());
            PersistedState::default()
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PersistedState {
        self.lock().clone()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.lock().settings.clone()
    }

    pub fn stats(&self) -> Stats {
        self.lock().stats
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().logs.iter().cloned().collect()
    }

    pub fn applied_history(&self) -> Vec<AppliedRecord> {
        self.lock().applied_history.clone()
    }

    pub fn save_settings(&self, settings: &Settings) -> AppResult<()> {
        let mut state = self.lock();
        state.settings = Some(settings.clone());
        self.persist(&state)
    }

    /// 追加一条日志，超出上限时丢弃最旧的
    pub fn append_log(&self, message: impl Into<String>) -> AppResult<()> {
        let mut state = self.lock();
        push_log(&mut state, message.into());
        self.persist(&state)
    }

    pub fn clear_logs(&self) -> AppResult<()> {
        let mut state = self.lock();
        state.logs.clear();
        self.persist(&state)
    }

    /// 记录职位结果：累计统计 + 日志 + 已申请记录
    pub fn record_outcome(&self, posting: &Posting, outcome: &ApplicationOutcome) -> AppResult<()> {
        let mut state = self.lock();
        state.stats.record(outcome);

        let message = match outcome {
            ApplicationOutcome::Applied => {
                state.applied_history.push(AppliedRecord {
                    id: posting.id.clone(),
                    title: posting.title.clone(),
                    company: posting.company.clone(),
                    applied_at: Local::now().to_rfc3339(),
                });
                let overflow = state.applied_history.len().saturating_sub(MAX_APPLIED_HISTORY);
                state.applied_history.drain(..overflow);
                format!("✅ Applied to: {}", posting)
            }
            ApplicationOutcome::Skipped(reason) => format!("⏭️ Skipped: {} - {}", posting, reason),
            ApplicationOutcome::Failed(reason) => format!("❌ Failed: {} - {}", posting, reason),
        };
        push_log(&mut state, message);

        self.persist(&state)
    }

    fn lock(&self) -> MutexGuard<'_, PersistedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, state: &PersistedState) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = StateFile {
            auto_apply: state.clone(),
        };
        let content =
            serde_json::to_string_pretty(&file).map_err(|source| StoreError::SerializeFailed {
                path: path.display().to_string(),
                source,
            })?;
        fs::write(path, content).map_err(|source| StoreError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

fn push_log(state: &mut PersistedState, message: String) {
    state.logs.push_back(LogEntry {
        timestamp: Local::now().format("%H:%M:%S").to_string(),
        message,
    });
    while state.logs.len() > MAX_LOG_ENTRIES {
        state.logs.pop_front();
    }
}
