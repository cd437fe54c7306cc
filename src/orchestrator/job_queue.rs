//! 职位队列处理器 - 编排层
//!
//! ## 职责
//!
//! 逐页、逐个处理搜索结果中的职位：
//!
//! 1. 每页应用一次筛选条件（Easy Apply / 发布时间）
//! 2. 已申请、命中排除列表的职位直接跳过（不打开详情）
//! 3. 打开详情读取描述，按经验年限和匹配分过滤
//! 4. 有 Easy Apply 入口的职位交给 [`ModalFlow`]
//! 5. 每个职位结束后上报结果，并按设置的间隔等待
//!
//! 达到申请上限、某一页没有职位、没有下一页时结束。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::error::is_stopped;
use crate::models::{ApplicationOutcome, Settings, SkipReason};
use crate::page::JobPage;
use crate::services::decision::DecisionService;
use crate::services::eligibility;
use crate::workflow::{ApplicationCtx, ModalFlow, ModalResult, RunControl};

/// 一次运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: u32,
    pub skipped: u32,
    pub failed: u32,
    /// 是否因停止信号结束
    pub stopped: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: &ApplicationOutcome) {
        match outcome {
            ApplicationOutcome::Applied => self.applied += 1,
            ApplicationOutcome::Skipped(_) => self.skipped += 1,
            ApplicationOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// 单页处理后的去向
enum PageEnd {
    Continue,
    Finished,
}

/// 职位队列处理器
pub struct JobQueueProcessor {
    page: Arc<dyn JobPage>,
    decision: Arc<dyn DecisionService>,
    control: Arc<dyn RunControl>,
    modal: ModalFlow,
}

impl JobQueueProcessor {
    pub fn new(
        page: Arc<dyn JobPage>,
        decision: Arc<dyn DecisionService>,
        control: Arc<dyn RunControl>,
        modal: ModalFlow,
    ) -> Self {
        Self {
            page,
            decision,
            control,
            modal,
        }
    }

    /// 运行到结束条件满足或收到停止信号
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut posting_index = 0usize;
        let mut page_number = 1usize;

        loop {
            match self
                .process_page(page_number, &mut posting_index, &mut summary)
                .await
            {
                Ok(PageEnd::Continue) => {}
                Ok(PageEnd::Finished) => break,
                Err(e) if is_stopped(&e) => {
                    summary.stopped = true;
                    break;
                }
                Err(e) => return Err(e),
            }

            match self.page.next_results_page().await {
                Ok(true) => {
                    page_number += 1;
                    info!("📄 翻到第 {} 页", page_number);
                }
                Ok(false) => {
                    info!("没有更多结果页");
                    break;
                }
                Err(e) => {
                    warn!("⚠️ 翻页失败，结束运行: {:#}", e);
                    break;
                }
            }
        }

        if summary.stopped {
            info!("⏹️ 运行已停止");
        }
        info!(
            "运行结束: 申请 {} / 跳过 {} / 失败 {}",
            summary.applied, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    async fn process_page(
        &self,
        page_number: usize,
        posting_index: &mut usize,
        summary: &mut RunSummary,
    ) -> Result<PageEnd> {
        self.control.checkpoint().await?;

        let settings = self.control.settings();
        if let Err(e) = self.page.apply_filters(&settings.search_filters()).await {
            warn!("⚠️ 第 {} 页应用筛选条件失败: {:#}", page_number, e);
        }

        let postings = match self.page.list_postings().await {
            Ok(postings) => postings,
            Err(e) => {
                error!("❌ 读取第 {} 页职位列表失败: {:#}", page_number, e);
                return Ok(PageEnd::Finished);
            }
        };

        if postings.is_empty() {
            info!("第 {} 页没有职位，结束运行", page_number);
            return Ok(PageEnd::Finished);
        }
        info!("📋 第 {} 页共 {} 个职位", page_number, postings.len());

        for posting in postings {
            let settings = self.control.settings();
            if summary.applied >= settings.max_applications {
                info!("🎯 已达到申请上限 {}", settings.max_applications);
                return Ok(PageEnd::Finished);
            }

            self.control.checkpoint().await?;

            *posting_index += 1;
            let mut ctx = ApplicationCtx::new(posting, *posting_index);
            info!("{} 处理: {}", ctx, ctx.posting);

            let outcome = match self.process_posting(&mut ctx, &settings).await {
                Ok(outcome) => outcome,
                Err(e) if is_stopped(&e) => {
                    let outcome = ApplicationOutcome::Failed("stopped".to_string());
                    self.control.record_outcome(&ctx.posting, &outcome);
                    summary.record(&outcome);
                    return Err(e);
                }
                Err(e) => {
                    error!("{} ❌ 处理失败: {:#}", ctx, e);
                    ApplicationOutcome::Failed(format!("{:#}", e))
                }
            };

            info!("{} 结果: {}", ctx, outcome);
            self.control.record_outcome(&ctx.posting, &outcome);
            summary.record(&outcome);

            self.control
                .wait(Duration::from_millis(settings.delay_between_postings_ms))
                .await?;
        }

        Ok(PageEnd::Continue)
    }

    async fn process_posting(
        &self,
        ctx: &mut ApplicationCtx,
        settings: &Settings,
    ) -> Result<ApplicationOutcome> {
        if ctx.posting.already_applied {
            return Ok(ApplicationOutcome::Skipped(SkipReason::AlreadyApplied));
        }
        if settings.is_excluded(&ctx.posting.title, &ctx.posting.company) {
            return Ok(ApplicationOutcome::Skipped(SkipReason::Excluded));
        }

        self.page
            .open_posting(&ctx.posting.id)
            .await
            .context("打开职位详情失败")?;
        let description = self
            .page
            .description_text()
            .await
            .context("读取职位描述失败")?;
        ctx.posting = ctx.posting.clone().with_description(description);

        if let Some(required) =
            eligibility::exceeds_experience(&ctx.posting.description_text, settings.max_experience_years)
        {
            return Ok(ApplicationOutcome::Skipped(SkipReason::ExperienceTooHigh {
                required,
                max: settings.max_experience_years,
            }));
        }

        if let Some(skip) = self.check_match_score(ctx, settings).await {
            return Ok(ApplicationOutcome::Skipped(skip));
        }

        if !self.page.has_easy_apply().await? {
            return Ok(ApplicationOutcome::Skipped(SkipReason::NoEasyApply));
        }

        self.control.checkpoint().await?;
        self.page
            .open_easy_apply()
            .await
            .context("打开 Easy Apply 弹窗失败")?;

        Ok(match self.modal.run(ctx, settings).await? {
            ModalResult::Done => ApplicationOutcome::Applied,
            ModalResult::Failed(reason) => ApplicationOutcome::Failed(reason),
        })
    }

    /// 匹配分过滤，分析失败时不跳过
    async fn check_match_score(&self, ctx: &ApplicationCtx, settings: &Settings) -> Option<SkipReason> {
        let min = settings.min_match_score?;
        if !settings.use_answer_service {
            return None;
        }

        info!("{} 🤖 分析职位匹配度...", ctx);
        match self
            .decision
            .analyze_job(&ctx.posting.description_text, &settings.profile.resume_text)
            .await
        {
            Ok(analysis) => {
                debug!(
                    "{} 匹配分 {}，缺少技能: {:?}",
                    ctx, analysis.match_score, analysis.missing_skills
                );
                (analysis.match_score < min).then_some(SkipReason::LowMatchScore {
                    score: analysis.match_score,
                    min,
                })
            }
            Err(e) => {
                warn!("{} ⚠️ 职位分析失败，继续申请: {:#}", ctx, e);
                None
            }
        }
    }
}
