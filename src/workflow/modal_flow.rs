//! 申请弹窗流程 - 流程层
//!
//! 核心职责：驱动"一个职位的 Easy Apply 弹窗"直到提交或失败
//!
//! 状态机：Filling → Advancing → {Done, Failed}，最多 `max_steps` 轮。
//! 每一轮：
//! 1. 填写当前步骤中所有未填写的字段（每个字段在一次申请中只处理一次，留空的也不再重试）
//! 2. 有 Submit 就提交，否则点 Next，都没有则视为页面尚未就绪
//!
//! 失败时总会尝试关闭弹窗（包括放弃确认），保证下一个职位从干净的页面开始。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::error::is_stopped;
use crate::models::{AnswerOutcome, ElementKind, FieldContext, FieldElement, FieldWrite, Settings};
use crate::page::{ControlRole, JobPage};
use crate::services::{answer_rules, AnswerResolver, FieldLabeler};
use crate::workflow::{ApplicationCtx, RunControl};

/// 弹窗流程结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResult {
    /// 已提交
    Done,
    /// 放弃（原因）
    Failed(String),
}

/// 申请弹窗流程
///
/// - 不直接接触 DOM，只通过 [`JobPage`] 的语义角色操作
/// - 答案来自 [`AnswerResolver`]
/// - 在每个字段之前、每次推进之前调用检查点
pub struct ModalFlow {
    page: Arc<dyn JobPage>,
    resolver: Arc<AnswerResolver>,
    control: Arc<dyn RunControl>,
    labeler: FieldLabeler,
    max_steps: usize,
    settle_delay: Duration,
}

impl ModalFlow {
    pub fn new(
        page: Arc<dyn JobPage>,
        resolver: Arc<AnswerResolver>,
        control: Arc<dyn RunControl>,
        max_steps: usize,
        settle_delay: Duration,
    ) -> Self {
        Self {
            page,
            resolver,
            control,
            labeler: FieldLabeler::new(),
            max_steps,
            settle_delay,
        }
    }

    /// 运行弹窗流程
    ///
    /// 页面错误折叠为 `Failed(原因)`；只有停止信号以错误形式返回
    pub async fn run(&self, ctx: &mut ApplicationCtx, settings: &Settings) -> Result<ModalResult> {
        match self.drive(ctx, settings).await {
            Ok(ModalResult::Done) => {
                info!("{} ✅ 申请已提交", ctx);
                Ok(ModalResult::Done)
            }
            Ok(ModalResult::Failed(reason)) => {
                warn!("{} ⚠️ 申请未完成: {}", ctx, reason);
                self.dismiss(ctx).await;
                Ok(ModalResult::Failed(reason))
            }
            Err(e) if is_stopped(&e) => {
                info!("{} ⏹️ 收到停止信号，关闭申请弹窗", ctx);
                self.dismiss(ctx).await;
                Err(e)
            }
            Err(e) => {
                error!("{} ❌ 申请弹窗出错: {:#}", ctx, e);
                self.dismiss(ctx).await;
                Ok(ModalResult::Failed(format!("{:#}", e)))
            }
        }
    }

    async fn drive(&self, ctx: &mut ApplicationCtx, settings: &Settings) -> Result<ModalResult> {
        for step in 1..=self.max_steps {
            self.control.checkpoint().await?;

            if !self.page.modal_open().await? {
                debug!("{} 第 {} 步: 弹窗未出现，等待页面", ctx, step);
                self.control.wait(self.settle_delay).await?;
                continue;
            }

            // ========== Filling ==========
            let filled = self.fill_step(ctx, settings).await?;
            debug!("{} 第 {} 步: 填写了 {} 个字段", ctx, step, filled);

            // ========== Advancing ==========
            self.control.checkpoint().await?;

            if self.page.has_control(ControlRole::Submit).await? {
                if settings.pause_before_submit {
                    info!("{} ⏸️ 提交前需要人工检查", ctx);
                    return Ok(ModalResult::Failed("manual review requested".to_string()));
                }

                info!("{} 📤 提交申请...", ctx);
                self.page
                    .click_control(ControlRole::Submit)
                    .await
                    .context("点击提交按钮失败")?;

                if self.page.has_control(ControlRole::Done).await? {
                    self.page
                        .click_control(ControlRole::Done)
                        .await
                        .context("点击完成按钮失败")?;
                    return Ok(ModalResult::Done);
                }
                if !self.page.modal_open().await? {
                    return Ok(ModalResult::Done);
                }
                debug!("{} 提交后弹窗仍在，可能存在校验错误", ctx);
            } else if self.page.has_control(ControlRole::Next).await? {
                debug!("{} ➡️ 下一步", ctx);
                self.page
                    .click_control(ControlRole::Next)
                    .await
                    .context("点击下一步按钮失败")?;
            } else {
                debug!("{} 第 {} 步: 未找到 Submit / Next，稍后重试", ctx, step);
                self.control.wait(self.settle_delay).await?;
            }
        }

        Ok(ModalResult::Failed("exceeded step budget".to_string()))
    }

    /// 填写当前步骤，返回写入的字段数
    async fn fill_step(&self, ctx: &mut ApplicationCtx, settings: &Settings) -> Result<usize> {
        let fields = self
            .page
            .visible_fields()
            .await
            .context("读取表单字段失败")?;

        let mut filled = 0;
        for element in &fields {
            self.control.checkpoint().await?;

            if element.has_value {
                continue;
            }
            let Some(kind) = element.kind else {
                continue;
            };
            if !ctx.first_attempt(&element.id) {
                continue;
            }
            let Some(label) = self.labeler.label(element) else {
                debug!("{} 无法识别字段 {}，跳过", ctx, element.id);
                continue;
            };

            let write = if kind == ElementKind::Checkbox {
                // 只自动勾选同意条款类的复选框
                answer_rules::is_agreement_label(&label).then_some(FieldWrite::Check)
            } else {
                self.answer_field(ctx, settings, element, kind, &label)
                    .await?
            };

            let Some(write) = write else {
                continue;
            };

            self.page
                .write_field(&element.id, &write)
                .await
                .with_context(|| format!("写入字段失败: {}", label))?;
            if let Some(value) = write.value() {
                ctx.remember(&label, value);
            }
            filled += 1;
        }

        Ok(filled)
    }

    async fn answer_field(
        &self,
        ctx: &ApplicationCtx,
        settings: &Settings,
        element: &FieldElement,
        kind: ElementKind,
        label: &str,
    ) -> Result<Option<FieldWrite>> {
        let field = FieldContext {
            label: label.to_string(),
            element_kind: kind,
            options: element.options.clone(),
            already_has_value: element.has_value,
        };

        match self.resolver.resolve(label, &field, ctx, settings).await? {
            AnswerOutcome::Answer(answer) => {
                let write = plan_write(kind, &answer, &element.options);
                if write.is_none() {
                    debug!("{} 答案 \"{}\" 不匹配任何选项: {}", ctx, answer, label);
                }
                Ok(write)
            }
            AnswerOutcome::NeedHumanInput(reason) => {
                info!("{} 字段留空: {} ({})", ctx, label, reason);
                Ok(None)
            }
            AnswerOutcome::Unresolved => {
                info!("{} 字段留空: {}", ctx, label);
                Ok(None)
            }
        }
    }

    /// 关闭弹窗，错误只记录不返回
    async fn dismiss(&self, ctx: &ApplicationCtx) {
        let result: Result<()> = async {
            if !self.page.modal_open().await? {
                return Ok(());
            }
            if self.page.has_control(ControlRole::Dismiss).await? {
                self.page.click_control(ControlRole::Dismiss).await?;
                tokio::time::sleep(self.settle_delay).await;
            }
            if self.page.has_control(ControlRole::Discard).await? {
                self.page.click_control(ControlRole::Discard).await?;
                tokio::time::sleep(self.settle_delay).await;
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!("{} ⚠️ 关闭申请弹窗失败: {:#}", ctx, e);
        }
    }
}

/// 按字段类型决定写入方式，选择类字段匹配不到选项时返回 `None`
pub fn plan_write(kind: ElementKind, answer: &str, options: &[String]) -> Option<FieldWrite> {
    match kind {
        ElementKind::Text | ElementKind::TextArea => Some(FieldWrite::SetText(answer.to_string())),
        ElementKind::Select => match_option(answer, options).map(|o| FieldWrite::SelectOption(o.to_string())),
        ElementKind::Radio => match_option(answer, options).map(|o| FieldWrite::ChooseRadio(o.to_string())),
        ElementKind::Checkbox => None,
    }
}

/// 选项匹配：忽略大小写，任一方向包含即可，第一个匹配的选项胜出
pub fn match_option<'a>(answer: &str, options: &'a [String]) -> Option<&'a str> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return None;
    }

    options
        .iter()
        .find(|option| {
            let option = option.trim().to_lowercase();
            !option.is_empty() && (option.contains(&answer) || answer.contains(&option))
        })
        .map(String::as_str)
}
