//! 答案解析服务 - 业务能力层
//!
//! 三层策略：
//! 1. 静态规则表（个人资料）
//! 2. 委托决策服务（AI）
//! 3. 人工输入
//!
//! 求职信问题单独走生成流程，可选人工确认。

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::is_stopped;
use crate::models::{AnswerOutcome, ElementKind, FieldContext, Settings};
use crate::services::answer_rules;
use crate::services::decision::{AnswerRequest, CoverLetterRequest, DecisionAnswer, DecisionService};
use crate::services::human_input::{HumanInput, HumanReply, ReviewDecision};
use crate::utils::logging::truncate_text;
use crate::workflow::ApplicationCtx;

/// 求职信最多重新生成的次数
const MAX_COVER_LETTER_REGENERATIONS: usize = 3;

/// 答案解析
///
/// 只在用户停止运行时返回错误，其余失败都折叠为 [`AnswerOutcome`]
pub struct AnswerResolver {
    decision: Arc<dyn DecisionService>,
    human: Arc<dyn HumanInput>,
}

impl AnswerResolver {
    pub fn new(decision: Arc<dyn DecisionService>, human: Arc<dyn HumanInput>) -> Self {
        Self { decision, human }
    }

    pub async fn resolve(
        &self,
        question: &str,
        field: &FieldContext,
        ctx: &ApplicationCtx,
        settings: &Settings,
    ) -> Result<AnswerOutcome> {
        if settings.generate_cover_letter
            && matches!(field.element_kind, ElementKind::Text | ElementKind::TextArea)
            && answer_rules::is_cover_letter_question(question)
        {
            return self.resolve_cover_letter(ctx, settings).await;
        }

        // 第一层：静态规则
        if let Some(answer) = answer_rules::lookup(question, &settings.profile) {
            debug!("{} 规则命中: {} -> {}", ctx, question, answer);
            return Ok(AnswerOutcome::Answer(answer));
        }

        // 第二层：决策服务
        let outcome = if settings.use_answer_service {
            self.delegate(question, field, ctx, settings).await
        } else {
            AnswerOutcome::NeedHumanInput("no matching rule".to_string())
        };

        // 第三层：人工输入
        match outcome {
            AnswerOutcome::NeedHumanInput(reason) if settings.pause_for_unknown_field => {
                self.ask_human(question, &reason, ctx).await
            }
            other => Ok(other),
        }
    }

    /// 委托决策服务，每个字段只调用一次
    async fn delegate(
        &self,
        question: &str,
        field: &FieldContext,
        ctx: &ApplicationCtx,
        settings: &Settings,
    ) -> AnswerOutcome {
        let options = match field.element_kind {
            ElementKind::Select | ElementKind::Radio => field.options.clone(),
            _ => Vec::new(),
        };
        let request = AnswerRequest {
            question: question.to_string(),
            element_kind: field.element_kind,
            options,
            job_description: ctx.posting.description_text.clone(),
            prior_answers: ctx.prior_answers.clone(),
            resume_text: settings.profile.resume_text.clone(),
            additional_instructions: settings.additional_instructions.clone(),
        };

        info!("{} 🤖 委托 AI 回答: {}", ctx, question);
        match self.decision.answer_question(&request).await {
            Ok(DecisionAnswer::Answer(answer)) => {
                info!("{} ✓ AI 回答: {}", ctx, truncate_text(&answer, 80));
                AnswerOutcome::Answer(answer)
            }
            Ok(DecisionAnswer::NeedInput(reason)) => {
                info!("{} AI 无法回答: {}", ctx, reason);
                AnswerOutcome::NeedHumanInput(reason)
            }
            Err(e) => {
                warn!("{} ⚠️ AI 调用失败: {}", ctx, e);
                AnswerOutcome::NeedHumanInput(format!("AI error - {}", e))
            }
        }
    }

    async fn ask_human(
        &self,
        question: &str,
        reason: &str,
        ctx: &ApplicationCtx,
    ) -> Result<AnswerOutcome> {
        info!("{} 🙋 等待人工输入: {} ({})", ctx, question, reason);
        match self.human.ask(question, reason).await? {
            HumanReply::Answer(answer) if !answer.trim().is_empty() => {
                info!("{} ✓ 收到人工回答", ctx);
                Ok(AnswerOutcome::Answer(answer.trim().to_string()))
            }
            _ => {
                info!("{} 用户跳过了该字段", ctx);
                Ok(AnswerOutcome::Unresolved)
            }
        }
    }

    async fn resolve_cover_letter(
        &self,
        ctx: &ApplicationCtx,
        settings: &Settings,
    ) -> Result<AnswerOutcome> {
        let request = CoverLetterRequest {
            title: ctx.posting.title.clone(),
            company: ctx.posting.company.clone(),
            job_description: ctx.posting.description_text.clone(),
            resume_text: settings.profile.resume_text.clone(),
            style: settings.cover_letter_style,
            additional_instructions: settings.additional_instructions.clone(),
        };

        for attempt in 0..=MAX_COVER_LETTER_REGENERATIONS {
            info!("{} ✍️ 生成求职信 (第 {} 次)", ctx, attempt + 1);
            let draft = match self.decision.generate_cover_letter(&request).await {
                Ok(draft) => draft,
                Err(e) => {
                    warn!("{} ⚠️ 求职信生成失败: {}", ctx, e);
                    let reason = format!("AI error - {}", e);
                    return if settings.pause_for_unknown_field {
                        self.ask_human("Cover letter", &reason, ctx).await
                    } else {
                        Ok(AnswerOutcome::NeedHumanInput(reason))
                    };
                }
            };

            if !settings.review_cover_letter {
                return Ok(AnswerOutcome::Answer(draft));
            }

            info!("{} 🙋 等待确认求职信", ctx);
            match self.human.review_cover_letter(&draft).await {
                Ok(ReviewDecision::Approve) => return Ok(AnswerOutcome::Answer(draft)),
                Ok(ReviewDecision::Skip) => return Ok(AnswerOutcome::Unresolved),
                Ok(ReviewDecision::Regenerate) => continue,
                Err(e) if is_stopped(&e) => return Err(e),
                Err(e) => {
                    warn!("{} ⚠️ 求职信确认失败: {}", ctx, e);
                    return Ok(AnswerOutcome::Unresolved);
                }
            }
        }

        warn!(
            "{} 求职信已重新生成 {} 次，放弃该字段",
            ctx, MAX_COVER_LETTER_REGENERATIONS
        );
        Ok(AnswerOutcome::Unresolved)
    }
}
