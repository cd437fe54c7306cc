//! 会话控制器 - 编排层
//!
//! ## 职责
//!
//! - 持有唯一的 [`RunState`]，所有状态迁移都经过这里
//! - 启动 / 停止 / 暂停 / 恢复工作任务
//! - 为流程层提供检查点（[`RunControl`]）和人工输入（[`HumanInput`]）
//! - 处理协议请求（[`Request`] → [`Response`]）
//!
//! 状态机：`Idle → Running ⇄ Paused`，人工输入期间 `Running → AwaitingInput → Running`，
//! 任何状态都可以 `stop → Idle`。
//!
//! 停止和暂停都通过 `watch` 通道广播，工作任务在下一个检查点响应。

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{is_stopped, AppError};
use crate::models::{ApplicationOutcome, Posting, RunState, RunStatus, Settings, Stats};
use crate::orchestrator::job_queue::JobQueueProcessor;
use crate::orchestrator::protocol::{Request, Response};
use crate::page::JobPage;
use crate::services::decision::{AnswerRequest, CoverLetterRequest, DecisionAnswer, DecisionService};
use crate::services::state_store::LogEntry;
use crate::services::{AnswerResolver, HumanInput, HumanReply, ReviewDecision, StateStore};
use crate::utils::logging::print_final_stats;
use crate::workflow::{ModalFlow, RunControl};

/// 广播给工作任务的控制信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Run,
    Pause,
    Stop,
}

/// 提示由谁发起，决定停止信号如何取消它
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptScope {
    /// 工作任务内部发起，跟随控制信号
    Worker,
    /// 驱动方通过 needUserInput 发起，只在 stop 丢弃发送端时取消
    Driver,
}

/// 正在等待用户回复的提示
enum PendingPrompt {
    Question(oneshot::Sender<HumanReply>),
    CoverLetter(oneshot::Sender<ReviewDecision>),
}

/// 引擎参数（来自 [`crate::config::Config`]）
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub max_steps: usize,
    pub settle_delay: Duration,
}

/// 控制器与工作任务共享的状态
struct SessionShared {
    state: watch::Sender<RunState>,
    control: watch::Sender<Control>,
    settings: RwLock<Arc<Settings>>,
    pending: Mutex<Option<PendingPrompt>>,
    store: StateStore,
}

impl SessionShared {
    fn new(settings: Settings, store: StateStore) -> Self {
        let (state, _) = watch::channel(RunState::default());
        let (control, _) = watch::channel(Control::Run);
        Self {
            state,
            control,
            settings: RwLock::new(Arc::new(settings)),
            pending: Mutex::new(None),
            store,
        }
    }

    fn status(&self) -> RunStatus {
        self.state.borrow().status
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingPrompt>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log(&self, message: impl Into<String>) {
        if let Err(e) = self.store.append_log(message) {
            warn!("⚠️ 写入日志缓冲失败: {}", e);
        }
    }

    /// 挂起当前申请，等待用户回复
    async fn prompt<T>(
        &self,
        question: String,
        scope: PromptScope,
        make_pending: impl FnOnce(oneshot::Sender<T>) -> PendingPrompt + Send,
    ) -> Result<T>
    where
        T: Send,
    {
        let mut control = self.control.subscribe();
        if scope == PromptScope::Worker && *control.borrow_and_update() == Control::Stop {
            return Err(AppError::Stopped.into());
        }

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending();
            if pending.is_some() {
                bail!("已有一个等待回答的问题");
            }
            *pending = Some(make_pending(tx));
        }

        let mut previous = RunStatus::Running;
        self.state.send_modify(|s| {
            previous = s.status;
            s.status = RunStatus::AwaitingInput;
            s.pending_question = Some(question.clone());
        });
        self.log(format!("❓ Need input: {}", question));

        let reply = match scope {
            PromptScope::Worker => tokio::select! {
                reply = rx => reply.ok(),
                _ = stop_requested(&mut control) => None,
            },
            PromptScope::Driver => rx.await.ok(),
        };

        self.state.send_if_modified(|s| {
            if s.status != RunStatus::AwaitingInput {
                return false;
            }
            s.status = previous;
            s.pending_question = None;
            true
        });

        reply.ok_or_else(|| AppError::Stopped.into())
    }

    /// 驱动方发起的提问，不受上一次运行留下的停止信号影响
    async fn ask_for_driver(&self, question: &str) -> Result<HumanReply> {
        info!("❓ 驱动方请求人工输入: {}", question);
        self.prompt(question.to_string(), PromptScope::Driver, PendingPrompt::Question)
            .await
    }
}

/// 直到收到停止信号才返回
async fn stop_requested(control: &mut watch::Receiver<Control>) {
    loop {
        let current = *control.borrow_and_update();
        if current == Control::Stop || control.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl RunControl for SessionShared {
    async fn checkpoint(&self) -> Result<()> {
        let mut control = self.control.subscribe();
        loop {
            let current = *control.borrow_and_update();
            match current {
                Control::Run => return Ok(()),
                Control::Stop => return Err(AppError::Stopped.into()),
                Control::Pause => {
                    debug!("⏸️ 已暂停，等待恢复");
                    if control.changed().await.is_err() {
                        return Err(AppError::Stopped.into());
                    }
                }
            }
        }
    }

    async fn wait(&self, delay: Duration) -> Result<()> {
        let mut control = self.control.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop_requested(&mut control) => {}
        }
        self.checkpoint().await
    }

    fn settings(&self) -> Arc<Settings> {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record_outcome(&self, posting: &Posting, outcome: &ApplicationOutcome) {
        self.state.send_modify(|s| match outcome {
            ApplicationOutcome::Applied => s.applied_count += 1,
            ApplicationOutcome::Skipped(_) => s.skipped_count += 1,
            ApplicationOutcome::Failed(_) => s.failed_count += 1,
        });
        if let Err(e) = self.store.record_outcome(posting, outcome) {
            warn!("⚠️ 保存结果失败: {}", e);
        }
    }
}

#[async_trait]
impl HumanInput for SessionShared {
    async fn ask(&self, question: &str, reason: &str) -> Result<HumanReply> {
        info!("❓ 需要人工输入: {} ({})", question, reason);
        self.prompt(question.to_string(), PromptScope::Worker, PendingPrompt::Question)
            .await
    }

    async fn review_cover_letter(&self, draft: &str) -> Result<ReviewDecision> {
        info!("📝 求职信等待确认");
        self.prompt(
            format!("请确认求职信:\n{}", draft),
            PromptScope::Worker,
            PendingPrompt::CoverLetter,
        )
        .await
    }
}

/// 会话控制器
pub struct SessionController {
    shared: Arc<SessionShared>,
    page: Arc<dyn JobPage>,
    decision: Arc<dyn DecisionService>,
    options: EngineOptions,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(
        page: Arc<dyn JobPage>,
        decision: Arc<dyn DecisionService>,
        settings: Settings,
        store: StateStore,
        options: EngineOptions,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared::new(settings, store)),
            page,
            decision,
            options,
            worker: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        self.shared.state.borrow().clone()
    }

    /// 订阅状态变化（UI / 控制台通知）
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.shared.state.subscribe()
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.shared.settings()
    }

    pub fn stats(&self) -> Stats {
        self.shared.store.stats()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.shared.store.logs()
    }

    /// Idle → Running，页面不是职位搜索页时保持 Idle
    pub async fn start(&self) -> bool {
        let mut worker = self.worker.lock().await;

        if self.shared.status() != RunStatus::Idle {
            warn!("⚠️ 会话已在运行中，忽略 start");
            return false;
        }
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("⚠️ 上一次运行尚未结束，请稍后再试");
            return false;
        }

        match self.page.is_job_search_page().await {
            Ok(true) => {}
            Ok(false) => {
                if !self.open_search_page().await {
                    return false;
                }
            }
            Err(e) => {
                warn!("⚠️ 无法检查当前页面: {:#}", e);
                self.shared.log(format!("⚠️ Cannot inspect page: {:#}", e));
                return false;
            }
        }

        self.shared.control.send_replace(Control::Run);
        self.shared.state.send_replace(RunState {
            status: RunStatus::Running,
            ..RunState::default()
        });
        self.shared.log("▶️ Started auto-apply");
        info!("▶️ 开始自动申请");

        let processor = self.build_processor();
        let shared = self.shared.clone();
        *worker = Some(tokio::spawn(async move {
            match processor.run().await {
                Ok(summary) => debug!("运行汇总: {:?}", summary),
                Err(e) => error!("❌ 运行异常结束: {:#}", e),
            }

            let final_state = shared.state.borrow().clone();
            print_final_stats(&final_state);
            shared.state.send_modify(|s| {
                s.status = RunStatus::Idle;
                s.pending_question = None;
            });
            shared.log(format!(
                "🏁 Finished: {} applied, {} skipped, {} failed",
                final_state.applied_count, final_state.skipped_count, final_state.failed_count
            ));
        }));

        true
    }

    /// 按设置中的关键词打开搜索结果页，打开后仍不是搜索页则放弃
    async fn open_search_page(&self) -> bool {
        let Some(url) = self.settings().search_url() else {
            warn!("⚠️ 当前页面不是职位搜索页，请先打开职位搜索结果");
            self.shared.log("⚠️ Please navigate to a job search page first");
            return false;
        };

        info!("🔎 打开职位搜索页: {}", url);
        self.shared.log("🔎 Opening LinkedIn Jobs...");
        if let Err(e) = self.page.navigate(&url).await {
            warn!("⚠️ 无法打开职位搜索页: {:#}", e);
            self.shared.log(format!("⚠️ Cannot open job search: {:#}", e));
            return false;
        }

        match self.page.is_job_search_page().await {
            Ok(true) => true,
            Ok(false) => {
                warn!("⚠️ 导航后仍不是职位搜索页");
                self.shared.log("⚠️ Please navigate to a job search page first");
                false
            }
            Err(e) => {
                warn!("⚠️ 无法检查当前页面: {:#}", e);
                self.shared.log(format!("⚠️ Cannot inspect page: {:#}", e));
                false
            }
        }
    }

    fn build_processor(&self) -> JobQueueProcessor {
        let resolver = Arc::new(AnswerResolver::new(
            self.decision.clone(),
            self.shared.clone(),
        ));
        let modal = ModalFlow::new(
            self.page.clone(),
            resolver,
            self.shared.clone(),
            self.options.max_steps,
            self.options.settle_delay,
        );
        JobQueueProcessor::new(
            self.page.clone(),
            self.decision.clone(),
            self.shared.clone(),
            modal,
        )
    }

    /// 任何状态 → Idle，丢弃待回答的问题
    pub fn stop(&self) -> bool {
        self.shared.control.send_replace(Control::Stop);
        // 丢弃发送端即唤醒等待中的提示
        self.shared.pending().take();

        let mut was = RunStatus::Idle;
        self.shared.state.send_modify(|s| {
            was = s.status;
            s.status = RunStatus::Idle;
            s.pending_question = None;
        });
        if was != RunStatus::Idle {
            info!("⏹️ 已停止");
            self.shared.log("⏹️ Stopped");
        }
        true
    }

    /// Running → Paused，在下一个检查点生效
    pub fn pause(&self) -> bool {
        let paused = self.shared.state.send_if_modified(|s| {
            if s.status != RunStatus::Running {
                return false;
            }
            s.status = RunStatus::Paused;
            true
        });
        if paused {
            self.shared.control.send_replace(Control::Pause);
            info!("⏸️ 已暂停");
            self.shared.log("⏸️ Paused");
        }
        paused
    }

    /// Paused → Running
    pub fn resume(&self) -> bool {
        let resumed = self.shared.state.send_if_modified(|s| {
            if s.status != RunStatus::Paused {
                return false;
            }
            s.status = RunStatus::Running;
            true
        });
        if resumed {
            self.shared.control.send_replace(Control::Run);
            info!("▶️ 已恢复");
            self.shared.log("▶️ Resumed");
        }
        resumed
    }

    /// 替换设置，只影响之后的检查点
    pub fn update_settings(&self, settings: Settings) {
        if let Err(e) = self.shared.store.save_settings(&settings) {
            warn!("⚠️ 保存设置失败: {}", e);
        }
        *self
            .shared
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(settings);
        info!("⚙️ 设置已更新");
        self.shared.log("⚙️ Settings updated");
    }

    /// 回答当前问题
    pub fn provide_user_input(&self, answer: String) -> bool {
        let mut pending = self.shared.pending();
        match pending.take() {
            Some(PendingPrompt::Question(tx)) => tx.send(HumanReply::Answer(answer)).is_ok(),
            other => {
                *pending = other;
                warn!("⚠️ 当前没有等待回答的问题");
                false
            }
        }
    }

    /// 跳过当前问题或求职信
    pub fn skip_user_input(&self) -> bool {
        match self.shared.pending().take() {
            Some(PendingPrompt::Question(tx)) => tx.send(HumanReply::Skip).is_ok(),
            Some(PendingPrompt::CoverLetter(tx)) => tx.send(ReviewDecision::Skip).is_ok(),
            None => {
                warn!("⚠️ 当前没有等待回答的问题");
                false
            }
        }
    }

    /// 对求职信草稿做出决定
    pub fn review_cover_letter(&self, decision: ReviewDecision) -> bool {
        let mut pending = self.shared.pending();
        match pending.take() {
            Some(PendingPrompt::CoverLetter(tx)) => tx.send(decision).is_ok(),
            other => {
                *pending = other;
                warn!("⚠️ 当前没有等待确认的求职信");
                false
            }
        }
    }

    /// 等待工作任务结束
    pub async fn wait_finished(&self) {
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("❌ 工作任务异常退出: {}", e);
            }
        }
    }

    /// 处理一条协议请求
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Start => Response::ack(self.start().await),
            Request::Stop => Response::ack(self.stop()),
            Request::Pause => Response::ack(self.pause()),
            Request::Resume => Response::ack(self.resume()),
            Request::GetState => Response::State(self.state()),
            Request::GetStats => Response::Stats(self.stats()),
            Request::GetLogs => Response::Logs { logs: self.logs() },
            Request::ClearLogs => match self.shared.store.clear_logs() {
                Ok(()) => Response::ack(true),
                Err(e) => Response::Error {
                    error: e.to_string(),
                },
            },
            Request::SettingsUpdated { settings } => {
                self.update_settings(settings);
                Response::ack(true)
            }
            Request::AnswerQuestion(request) => self.answer_question(request).await,
            Request::GenerateCoverLetter(request) => self.generate_cover_letter(request).await,
            Request::AnalyzeJob { job_description } => {
                let settings = self.settings();
                match self
                    .decision
                    .analyze_job(&job_description, &settings.profile.resume_text)
                    .await
                {
                    Ok(analysis) => Response::Analysis(analysis),
                    Err(e) => Response::error(&e),
                }
            }
            Request::NeedUserInput { question } => {
                match self.shared.ask_for_driver(&question).await {
                    Ok(HumanReply::Answer(answer)) => Response::UserInput {
                        answer: Some(answer),
                    },
                    Ok(HumanReply::Skip) => Response::UserInput { answer: None },
                    Err(e) if is_stopped(&e) => Response::UserInput { answer: None },
                    Err(e) => Response::error(&e),
                }
            }
            Request::ProvideUserInput { answer } => Response::ack(self.provide_user_input(answer)),
            Request::SkipUserInput => Response::ack(self.skip_user_input()),
            Request::ReviewCoverLetter { decision } => {
                Response::ack(self.review_cover_letter(decision))
            }
            Request::ApplicationOutcome { posting, outcome } => {
                self.shared.record_outcome(&posting, &outcome);
                Response::ack(true)
            }
        }
    }

    async fn answer_question(&self, mut request: AnswerRequest) -> Response {
        let settings = self.settings();
        if request.resume_text.is_empty() {
            request.resume_text = settings.profile.resume_text.clone();
        }
        if request.additional_instructions.is_empty() {
            request.additional_instructions = settings.additional_instructions.clone();
        }

        match self.decision.answer_question(&request).await {
            Ok(DecisionAnswer::Answer(answer)) => Response::Answer { answer },
            Ok(DecisionAnswer::NeedInput(reason)) => Response::need_input(reason),
            Err(e) => {
                warn!("⚠️ AI 调用失败: {:#}", e);
                Response::need_input(format!("AI error - {:#}", e))
            }
        }
    }

    async fn generate_cover_letter(&self, mut request: CoverLetterRequest) -> Response {
        let settings = self.settings();
        if request.resume_text.is_empty() {
            request.resume_text = settings.profile.resume_text.clone();
        }
        if request.additional_instructions.is_empty() {
            request.additional_instructions = settings.additional_instructions.clone();
        }

        match self.decision.generate_cover_letter(&request).await {
            Ok(cover_letter) => Response::CoverLetter { cover_letter },
            Err(e) => Response::error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementKind;
    use crate::testing::{field, posting, FakeDecision, FakePage, FakeStep};
    use tokio_test::assert_ok;

    fn settings() -> Settings {
        Settings {
            delay_between_postings_ms: 0,
            ..Settings::default()
        }
    }

    fn options() -> EngineOptions {
        EngineOptions {
            max_steps: 10,
            settle_delay: Duration::ZERO,
        }
    }

    fn controller(page: FakePage, decision: FakeDecision) -> (SessionController, Arc<FakePage>) {
        let page = Arc::new(page);
        let controller = SessionController::new(
            page.clone(),
            Arc::new(decision),
            settings(),
            StateStore::in_memory(),
            options(),
        );
        (controller, page)
    }

    /// 一个需要人工填写的职位
    fn page_needing_input() -> FakePage {
        let mut page = FakePage::with_steps(vec![FakeStep::submit(vec![field(
            "salary",
            ElementKind::Text,
            "Desired salary",
        )])]);
        page.pages = vec![vec![posting("p1", "Rust Engineer", "Initech")]];
        page
    }

    async fn wait_for_status(controller: &SessionController, status: RunStatus) -> RunState {
        let mut rx = controller.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.status == status))
            .await
            .expect("timed out waiting for status")
            .expect("state channel closed")
            .clone();
        state
    }

    #[tokio::test]
    async fn test_start_requires_job_search_page() {
        let page = FakePage {
            not_search_page: true,
            ..FakePage::default()
        };
        let (controller, _) = controller(page, FakeDecision::default());

        assert!(!controller.start().await);
        assert_eq!(controller.state().status, RunStatus::Idle);
        assert!(controller
            .logs()
            .iter()
            .any(|entry| entry.message.contains("job search page")));
    }

    #[tokio::test]
    async fn test_run_to_completion_counts_outcomes() {
        let mut page = FakePage::with_steps(vec![FakeStep::submit(Vec::new())]);
        page.pages = vec![vec![
            posting("p1", "Rust Engineer", "Initech"),
            Posting {
                already_applied: true,
                ..posting("p2", "Rust Engineer", "Hooli")
            },
        ]];
        let (controller, _) = controller(page, FakeDecision::default());

        assert!(controller.start().await);
        controller.wait_finished().await;

        let state = controller.state();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.applied_count, 1);
        assert_eq!(state.skipped_count, 1);
        assert_eq!(state.visited(), 2);
        assert_eq!(
            controller.stats(),
            Stats {
                applied: 1,
                skipped: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_human_input_round_trip() {
        let (controller, page) = controller(page_needing_input(), FakeDecision::default());

        assert!(controller.start().await);
        let state = wait_for_status(&controller, RunStatus::AwaitingInput).await;
        assert_eq!(state.pending_question.as_deref(), Some("Desired salary"));

        assert!(controller.provide_user_input("90000".to_string()));
        controller.wait_finished().await;

        assert_eq!(controller.state().applied_count, 1);
        assert_eq!(
            page.state().writes,
            vec![(
                "salary".to_string(),
                crate::models::FieldWrite::SetText("90000".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_stop_while_awaiting_input() {
        let (controller, page) = controller(page_needing_input(), FakeDecision::default());

        assert!(controller.start().await);
        wait_for_status(&controller, RunStatus::AwaitingInput).await;

        assert!(controller.stop());
        let state = controller.state();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.pending_question, None);

        controller.wait_finished().await;
        let state = controller.state();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.failed_count, 1);
        assert!(page.state().writes.is_empty());
        assert!(!controller.provide_user_input("late".to_string()));
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let (controller, _) = controller(page_needing_input(), FakeDecision::default());

        // 只能从 Running 暂停
        assert!(!controller.pause());
        assert!(!controller.resume());

        assert!(controller.start().await);
        wait_for_status(&controller, RunStatus::AwaitingInput).await;
        assert!(!controller.pause());

        assert!(controller.skip_user_input());
        controller.wait_finished().await;
        assert_eq!(controller.state().applied_count, 1);
    }

    #[tokio::test]
    async fn test_checkpoint_blocks_while_paused() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::default());
        let shared = controller.shared.clone();
        shared.state.send_modify(|s| s.status = RunStatus::Running);

        assert!(controller.pause());
        assert_eq!(controller.state().status, RunStatus::Paused);

        let waiter = tokio::spawn({
            let shared = shared.clone();
            async move { shared.checkpoint().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        assert!(controller.resume());
        assert_ok!(waiter.await.unwrap());

        controller.stop();
        assert!(is_stopped(&shared.checkpoint().await.unwrap_err()));
    }

    #[tokio::test]
    async fn test_settings_update_applies_to_later_reads() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::default());
        let before = controller.settings();

        controller.update_settings(Settings {
            max_applications: 3,
            ..settings()
        });

        assert_eq!(before.max_applications, 50);
        assert_eq!(controller.settings().max_applications, 3);
    }

    #[tokio::test]
    async fn test_handle_protocol_requests() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::failing("timeout"));

        let response = controller
            .handle(Request::AnswerQuestion(AnswerRequest {
                question: "Salary?".to_string(),
                element_kind: ElementKind::Text,
                options: Vec::new(),
                job_description: String::new(),
                prior_answers: Default::default(),
                resume_text: String::new(),
                additional_instructions: String::new(),
            }))
            .await;
        assert_eq!(response, Response::need_input("AI error - timeout"));

        let response = controller
            .handle(Request::ApplicationOutcome {
                posting: posting("p1", "SRE", "Hooli"),
                outcome: ApplicationOutcome::Failed("captcha".to_string()),
            })
            .await;
        assert_eq!(response, Response::ack(true));
        assert_eq!(controller.stats().failed, 1);

        match controller.handle(Request::GetLogs).await {
            Response::Logs { logs } => {
                assert_eq!(logs.last().unwrap().message, "❌ Failed: SRE @ Hooli - captcha")
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(controller.handle(Request::ClearLogs).await, Response::ack(true));
        assert!(controller.logs().is_empty());
    }

    #[tokio::test]
    async fn test_driver_question_waits_for_answer_after_stop() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::default());
        controller.stop();

        let (response, provided) = tokio::join!(
            controller.handle(Request::NeedUserInput {
                question: "Salary?".to_string(),
            }),
            async {
                let state = wait_for_status(&controller, RunStatus::AwaitingInput).await;
                assert_eq!(state.pending_question.as_deref(), Some("Salary?"));
                controller.provide_user_input("90000".to_string())
            }
        );

        assert!(provided);
        assert_eq!(
            response,
            Response::UserInput {
                answer: Some("90000".to_string())
            }
        );
        assert_eq!(controller.state().status, RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_stop_cancels_driver_question() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::default());

        let (response, _) = tokio::join!(
            controller.handle(Request::NeedUserInput {
                question: "Salary?".to_string(),
            }),
            async {
                wait_for_status(&controller, RunStatus::AwaitingInput).await;
                controller.stop()
            }
        );

        assert_eq!(response, Response::UserInput { answer: None });
        assert_eq!(controller.state().pending_question, None);
    }

    #[tokio::test]
    async fn test_stop_keeps_counters() {
        let (controller, _) = controller(FakePage::default(), FakeDecision::default());
        controller
            .shared
            .state
            .send_modify(|s| s.status = RunStatus::Running);
        controller
            .shared
            .record_outcome(&posting("p1", "SRE", "Hooli"), &ApplicationOutcome::Applied);

        assert!(controller.stop());

        let state = controller.state();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.applied_count, 1);
        assert!(controller
            .logs()
            .iter()
            .any(|entry| entry.message == "⏹️ Stopped"));
    }

    #[tokio::test]
    async fn test_start_opens_search_from_keywords() {
        let mut page = FakePage::with_steps(vec![FakeStep::submit(Vec::new())]);
        page.not_search_page = true;
        page.pages = vec![vec![posting("p1", "Rust Engineer", "Initech")]];
        let (controller, page) = controller(page, FakeDecision::default());
        controller.update_settings(Settings {
            search_terms: vec!["Rust Engineer".to_string()],
            search_location: "Remote".to_string(),
            ..settings()
        });

        assert!(controller.start().await);
        controller.wait_finished().await;

        assert_eq!(
            page.state().navigated,
            vec!["https://www.linkedin.com/jobs/search/?keywords=Rust%20Engineer&location=Remote".to_string()]
        );
        assert_eq!(controller.state().applied_count, 1);
    }
}

