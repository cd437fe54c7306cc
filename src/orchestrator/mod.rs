//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话生命周期和职位调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 连接浏览器、组装各层
//! - 加载设置、打开持久化存储
//! - 控制台命令循环
//!
//! ### `session` - 会话控制器
//! - 唯一持有 RunState 的状态机（Idle / Running / Paused / AwaitingInput）
//! - 检查点、可打断的等待、人工输入
//! - 协议请求分发
//!
//! ### `job_queue` - 职位队列处理器
//! - 逐页、逐个职位处理，按资格过滤
//! - 把可申请的职位交给 workflow::ModalFlow
//!
//! ### `protocol` - 消息协议
//!
//! ## 层次关系
//!
//! ```text
//! session (start / stop / pause / resume)
//!     ↓
//! job_queue (处理 Vec<Posting>)
//!     ↓
//! workflow::ModalFlow (处理单个申请弹窗)
//!     ↓
//! services (能力层：labeler / resolver / llm / store)
//!     ↓
//! page → infrastructure (JsExecutor)
//! ```

pub mod app;
pub mod job_queue;
pub mod protocol;
pub mod session;

pub use app::App;
pub use job_queue::{JobQueueProcessor, RunSummary};
pub use protocol::{parse_command, Request, Response};
pub use session::{EngineOptions, SessionController};
