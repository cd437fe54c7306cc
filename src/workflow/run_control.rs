//! 运行控制接口
//!
//! 流程层通过它在检查点上响应暂停 / 停止，读取当前设置并上报结果。
//! 实现见 [`crate::orchestrator::SessionController`]。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ApplicationOutcome, Posting, Settings};

#[async_trait]
pub trait RunControl: Send + Sync {
    /// 检查点：暂停时挂起直到恢复，停止时返回 [`crate::error::AppError::Stopped`]
    async fn checkpoint(&self) -> Result<()>;

    /// 可被停止命令打断的等待
    async fn wait(&self, delay: Duration) -> Result<()>;

    /// 当前生效的设置快照
    fn settings(&self) -> Arc<Settings>;

    /// 上报职位结果（计数 + 日志）
    fn record_outcome(&self, posting: &Posting, outcome: &ApplicationOutcome);
}
