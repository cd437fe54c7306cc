//! 单元测试用的内存替身：页面、决策服务、人工输入、运行控制

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    ApplicationOutcome, ElementKind, FieldElement, FieldWrite, Posting, SearchFilters, Settings,
};
use crate::page::{ControlRole, JobPage};
use crate::services::decision::{
    AnswerRequest, CoverLetterRequest, DecisionAnswer, DecisionService, JobAnalysis,
};
use crate::services::human_input::{HumanInput, HumanReply, ReviewDecision};
use crate::workflow::RunControl;

pub fn posting(id: &str, title: &str, company: &str) -> Posting {
    Posting {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        description_text: String::new(),
        already_applied: false,
    }
}

pub fn field(id: &str, kind: ElementKind, label: &str) -> FieldElement {
    FieldElement {
        id: id.to_string(),
        kind: Some(kind),
        group_label: Some(label.to_string()),
        ..FieldElement::default()
    }
}

pub fn choice_field(id: &str, kind: ElementKind, label: &str, options: &[&str]) -> FieldElement {
    FieldElement {
        options: options.iter().map(|o| o.to_string()).collect(),
        ..field(id, kind, label)
    }
}

/// 弹窗中的一步
#[derive(Debug, Clone, Default)]
pub struct FakeStep {
    pub fields: Vec<FieldElement>,
    pub has_next: bool,
    pub has_submit: bool,
}

impl FakeStep {
    pub fn next(fields: Vec<FieldElement>) -> Self {
        Self {
            fields,
            has_next: true,
            has_submit: false,
        }
    }

    pub fn submit(fields: Vec<FieldElement>) -> Self {
        Self {
            fields,
            has_next: false,
            has_submit: true,
        }
    }

    /// 没有任何可用按钮
    pub fn stuck(fields: Vec<FieldElement>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct FakePageState {
    pub results_page: usize,
    pub modal_open: bool,
    pub step: usize,
    pub done_visible: bool,
    pub writes: Vec<(String, FieldWrite)>,
    pub clicks: Vec<ControlRole>,
    pub opened: Vec<String>,
    pub filters_applied: usize,
    pub field_polls: usize,
    pub navigated: Vec<String>,
}

/// 脚本化的职位页面
///
/// 每个职位打开的申请弹窗都按 `steps` 的脚本进行
#[derive(Debug, Default)]
pub struct FakePage {
    pub not_search_page: bool,
    pub pages: Vec<Vec<Posting>>,
    pub descriptions: HashMap<String, String>,
    pub no_easy_apply: HashSet<String>,
    pub steps: Vec<FakeStep>,
    /// 提交后显示 Done 按钮而不是直接关闭弹窗
    pub submit_shows_done: bool,
    /// 提交后弹窗保持不变（模拟校验错误）
    pub submit_keeps_modal: bool,
    pub fail_write: Option<String>,
    pub state: Mutex<FakePageState>,
}

impl FakePage {
    pub fn with_steps(steps: Vec<FakeStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakePageState> {
        self.state.lock().unwrap()
    }

    fn current_step(&self, state: &FakePageState) -> Option<FakeStep> {
        if !state.modal_open {
            return None;
        }
        self.steps.get(state.step).cloned()
    }
}

#[async_trait]
impl JobPage for FakePage {
    async fn is_job_search_page(&self) -> Result<bool> {
        Ok(!self.not_search_page || !self.state().navigated.is_empty())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.state().navigated.push(url.to_string());
        Ok(())
    }

    async fn apply_filters(&self, _filters: &SearchFilters) -> Result<()> {
        self.state().filters_applied += 1;
        Ok(())
    }

    async fn list_postings(&self) -> Result<Vec<Posting>> {
        let page = self.state().results_page;
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }

    async fn open_posting(&self, posting_id: &str) -> Result<()> {
        self.state().opened.push(posting_id.to_string());
        Ok(())
    }

    async fn description_text(&self) -> Result<String> {
        let state = self.state();
        let id = state.opened.last().cloned().unwrap_or_default();
        Ok(self.descriptions.get(&id).cloned().unwrap_or_default())
    }

    async fn has_easy_apply(&self) -> Result<bool> {
        let state = self.state();
        let id = state.opened.last().cloned().unwrap_or_default();
        Ok(!self.no_easy_apply.contains(&id))
    }

    async fn open_easy_apply(&self) -> Result<()> {
        let mut state = self.state();
        state.modal_open = true;
        state.step = 0;
        state.done_visible = false;
        state.writes.clear();
        Ok(())
    }

    async fn modal_open(&self) -> Result<bool> {
        Ok(self.state().modal_open)
    }

    async fn visible_fields(&self) -> Result<Vec<FieldElement>> {
        let mut state = self.state();
        state.field_polls += 1;
        let Some(step) = self.current_step(&state) else {
            return Ok(Vec::new());
        };
        let written: HashSet<String> = state.writes.iter().map(|(id, _)| id.clone()).collect();
        Ok(step
            .fields
            .into_iter()
            .map(|mut f| {
                f.has_value = f.has_value || written.contains(&f.id);
                f
            })
            .collect())
    }

    async fn write_field(&self, field_id: &str, write: &FieldWrite) -> Result<()> {
        if self.fail_write.as_deref() == Some(field_id) {
            bail!("元素已从页面移除: {}", field_id);
        }
        self.state()
            .writes
            .push((field_id.to_string(), write.clone()));
        Ok(())
    }

    async fn has_control(&self, role: ControlRole) -> Result<bool> {
        let state = self.state();
        let step = self.current_step(&state);
        Ok(match role {
            ControlRole::Submit => step.is_some_and(|s| s.has_submit),
            ControlRole::Next => step.is_some_and(|s| s.has_next),
            ControlRole::Done => state.done_visible,
            ControlRole::Dismiss => state.modal_open,
            ControlRole::Discard => false,
        })
    }

    async fn click_control(&self, role: ControlRole) -> Result<()> {
        let mut state = self.state();
        state.clicks.push(role);
        match role {
            ControlRole::Submit => {
                if self.submit_keeps_modal {
                    // 校验失败，停留在当前步骤
                } else if self.submit_shows_done {
                    state.done_visible = true;
                } else {
                    state.modal_open = false;
                }
            }
            ControlRole::Next => state.step += 1,
            ControlRole::Done | ControlRole::Dismiss => {
                state.modal_open = false;
                state.done_visible = false;
            }
            ControlRole::Discard => {}
        }
        Ok(())
    }

    async fn next_results_page(&self) -> Result<bool> {
        let mut state = self.state();
        if state.results_page + 1 < self.pages.len() {
            state.results_page += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// 决策服务替身
#[derive(Debug, Default)]
pub struct FakeDecision {
    /// `None` 表示返回 NEED_INPUT，`Some(Err)` 表示调用失败
    pub reply: Option<Result<String, String>>,
    pub cover_letters: Mutex<VecDeque<String>>,
    pub analysis: Option<JobAnalysis>,
    pub requests: Mutex<Vec<AnswerRequest>>,
    pub cover_letter_calls: AtomicUsize,
    pub analyze_calls: AtomicUsize,
}

impl FakeDecision {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Some(Ok(answer.to_string())),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Some(Err(message.to_string())),
            ..Self::default()
        }
    }

    pub fn answer_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionService for FakeDecision {
    async fn answer_question(&self, request: &AnswerRequest) -> Result<DecisionAnswer> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(Ok(answer)) => Ok(DecisionAnswer::Answer(answer.clone())),
            Some(Err(message)) => bail!("{}", message),
            None => Ok(DecisionAnswer::NeedInput("not in resume".to_string())),
        }
    }

    async fn generate_cover_letter(&self, _request: &CoverLetterRequest) -> Result<String> {
        let n = self.cover_letter_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .cover_letters
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("Dear hiring manager #{}", n + 1)))
    }

    async fn analyze_job(&self, _job_description: &str, _resume_text: &str) -> Result<JobAnalysis> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        match &self.analysis {
            Some(analysis) => Ok(analysis.clone()),
            None => bail!("analysis unavailable"),
        }
    }
}

/// 人工输入替身：按顺序给出预设回复，用完后视为停止
#[derive(Debug, Default)]
pub struct ScriptedHuman {
    pub replies: Mutex<VecDeque<HumanReply>>,
    pub reviews: Mutex<VecDeque<ReviewDecision>>,
    pub asked: Mutex<Vec<String>>,
    pub reviewed: Mutex<Vec<String>>,
}

impl ScriptedHuman {
    pub fn replying(replies: Vec<HumanReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn reviewing(reviews: Vec<ReviewDecision>) -> Self {
        Self {
            reviews: Mutex::new(reviews.into()),
            ..Self::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl HumanInput for ScriptedHuman {
    async fn ask(&self, question: &str, _reason: &str) -> Result<HumanReply> {
        self.asked.lock().unwrap().push(question.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(reply),
            None => Err(AppError::Stopped.into()),
        }
    }

    async fn review_cover_letter(&self, draft: &str) -> Result<ReviewDecision> {
        self.reviewed.lock().unwrap().push(draft.to_string());
        match self.reviews.lock().unwrap().pop_front() {
            Some(decision) => Ok(decision),
            None => Err(AppError::Stopped.into()),
        }
    }
}

/// 运行控制替身
#[derive(Debug, Default)]
pub struct FakeControl {
    pub settings: Mutex<Arc<Settings>>,
    pub stopped: AtomicBool,
    /// 记录到第 N 个结果后触发停止
    pub stop_after_outcomes: Option<usize>,
    pub outcomes: Mutex<Vec<(Posting, ApplicationOutcome)>>,
    pub checkpoints: AtomicUsize,
}

impl FakeControl {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(Arc::new(settings)),
            ..Self::default()
        }
    }

    pub fn outcomes(&self) -> Vec<ApplicationOutcome> {
        self.outcomes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, o)| o.clone())
            .collect()
    }
}

#[async_trait]
impl RunControl for FakeControl {
    async fn checkpoint(&self) -> Result<()> {
        self.checkpoints.fetch_add(1, Ordering::SeqCst);
        if self.stopped.load(Ordering::SeqCst) {
            return Err(AppError::Stopped.into());
        }
        Ok(())
    }

    async fn wait(&self, _delay: Duration) -> Result<()> {
        self.checkpoint().await
    }

    fn settings(&self) -> Arc<Settings> {
        self.settings.lock().unwrap().clone()
    }

    fn record_outcome(&self, posting: &Posting, outcome: &ApplicationOutcome) {
        let mut outcomes = self.outcomes.lock().unwrap();
        outcomes.push((posting.clone(), outcome.clone()));
        if self.stop_after_outcomes == Some(outcomes.len()) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }
}
