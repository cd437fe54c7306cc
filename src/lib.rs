//! # Easy Apply Bot
//!
//! 在已登录的浏览器中自动完成 LinkedIn "Easy Apply" 职位申请
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `browser/` - 连接已打开的浏览器或启动无头浏览器
//! - `page/` - 按语义角色访问职位页面（`JobPage`），不向上暴露选择器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个字段或单个职位
//! - `FieldLabeler` - 从表单元素得出问题文字
//! - `AnswerResolver` - 静态规则 → AI → 人工 三层答案解析
//! - `LlmService` - 回答问题、生成求职信、分析职位
//! - `StateStore` - 设置、统计、日志的持久化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个申请弹窗"的完整处理流程
//! - `ApplicationCtx` - 上下文封装（职位 + 已给出的答案）
//! - `ModalFlow` - 步骤状态机（填写 → 推进 → 完成 / 失败）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 会话状态机，暂停 / 停止 / 人工输入
//! - `orchestrator/job_queue` - 职位队列，资格过滤与翻页
//! - `orchestrator/app` - 应用入口与控制台
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod page;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{ApplicationOutcome, Posting, RunState, RunStatus, Settings};
pub use orchestrator::{parse_command, App, Request, Response, SessionController};
pub use workflow::{ApplicationCtx, ModalFlow, ModalResult};
