//! 基于 Chrome 的页面实现
//!
//! 所有 DOM 操作都通过 [`JsExecutor`] 执行 JS 完成

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

use super::{ControlRole, JobPage};
use crate::infrastructure::JsExecutor;
use crate::models::{FieldElement, FieldWrite, Posting, SearchFilters};

const MODAL: &str = ".jobs-easy-apply-modal";
const FIELD_ATTR: &str = "data-auto-apply-id";

/// 写字段 / 点击按钮的 JS 返回值
#[derive(Debug, Deserialize)]
struct ActionResult {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Chrome 页面
///
/// 持有 JsExecutor，把语义角色翻译成具体的选择器
pub struct ChromeJobPage {
    executor: JsExecutor,
    settle_delay: Duration,
}

impl ChromeJobPage {
    pub fn new(executor: JsExecutor, settle_delay: Duration) -> Self {
        Self {
            executor,
            settle_delay,
        }
    }

    async fn settle(&self) {
        sleep(self.settle_delay).await;
    }

    /// 返回按钮元素（或 null）的 JS 表达式
    fn control_finder(role: ControlRole) -> String {
        let buttons_in = |scope: &str, words: &[&str]| {
            let aria = words
                .iter()
                .map(|w| format!(r#"{scope}.querySelector('button[aria-label*="{w}"]')"#))
                .collect::<Vec<_>>()
                .join(" || ");
            let text = words
                .iter()
                .map(|w| format!("b.textContent.includes('{w}')"))
                .collect::<Vec<_>>()
                .join(" || ");
            format!("({aria} || [...{scope}.querySelectorAll('button')].find(b => {text}) || null)")
        };

        let modal = format!("document.querySelector('{MODAL}')");
        match role {
            ControlRole::Submit => format!(
                "(() => {{ const m = {modal}; return m ? {} : null; }})()",
                buttons_in("m", &["Submit"])
            ),
            ControlRole::Next => format!(
                "(() => {{ const m = {modal}; return m ? {} : null; }})()",
                buttons_in("m", &["Continue", "Next", "Review"])
            ),
            ControlRole::Done => {
                "([...document.querySelectorAll('button')].find(b => b.textContent.includes('Done')) || null)"
                    .to_string()
            }
            ControlRole::Dismiss => format!(
                r#"(document.querySelector('{MODAL} button[aria-label="Dismiss"]') || document.querySelector('.artdeco-modal__dismiss'))"#
            ),
            ControlRole::Discard => {
                "([...document.querySelectorAll('button')].find(b => b.textContent.includes('Discard')) || null)"
                    .to_string()
            }
        }
    }

    async fn click_by_text_label(&self, text: &str) -> Result<bool> {
        let js = format!(
            r#"
            (() => {{
                const labels = document.querySelectorAll('label.search-reusables__value-label');
                for (const label of labels) {{
                    if (label.textContent.includes({text})) {{
                        label.click();
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
            text = serde_json::to_string(text)?
        );
        self.executor.eval_as(js).await
    }
}

#[async_trait]
impl JobPage for ChromeJobPage {
    async fn is_job_search_page(&self) -> Result<bool> {
        let url = self.executor.current_url().await?.unwrap_or_default();
        debug!("当前页面: {}", url);
        Ok(url.contains("linkedin.com/jobs"))
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.executor.goto(url).await?;
        self.settle().await;
        Ok(())
    }

    async fn apply_filters(&self, filters: &SearchFilters) -> Result<()> {
        if filters.easy_apply_only {
            let clicked: bool = self
                .executor
                .eval_as(
                    r#"
                    (() => {
                        const btn = document.getElementById('searchFilter_applyWithLinkedin');
                        if (btn && btn.getAttribute('aria-checked') === 'false') {
                            btn.click();
                            return true;
                        }
                        return false;
                    })()
                    "#,
                )
                .await?;
            if clicked {
                debug!("已开启 Easy Apply 筛选");
                self.settle().await;
            }
        }

        if let Some(label) = filters.date_posted.label() {
            let opened: bool = self
                .executor
                .eval_as(
                    r#"
                    (() => {
                        const btn = document.getElementById('searchFilter_timePostedRange');
                        if (!btn) return false;
                        btn.click();
                        return true;
                    })()
                    "#,
                )
                .await?;
            if opened {
                self.settle().await;
                if self.click_by_text_label(label).await? {
                    self.executor
                        .eval(
                            r#"
                            (() => {
                                const show = document.querySelector('button[data-test-reusables-filters-modal-show-results-button]')
                                    || [...document.querySelectorAll('button')].find(b => b.textContent.includes('Show'));
                                if (show) show.click();
                                return true;
                            })()
                            "#,
                        )
                        .await?;
                    debug!("已设置发布时间筛选: {}", label);
                }
            }
        }

        self.settle().await;
        Ok(())
    }

    async fn list_postings(&self) -> Result<Vec<Posting>> {
        self.executor
            .eval_as(
                r#"
                [...document.querySelectorAll('li[data-occludable-job-id]')].map(card => {
                    const title = card.querySelector('a.job-card-container__link')?.textContent?.trim()?.split('\n')[0] || 'Unknown';
                    const company = card.querySelector('.artdeco-entity-lockup__subtitle')?.textContent?.trim()?.split(' · ')[0] || 'Unknown';
                    const state = card.querySelector('.job-card-container__footer-job-state')?.textContent || '';
                    return {
                        id: card.getAttribute('data-occludable-job-id'),
                        title,
                        company,
                        descriptionText: '',
                        alreadyApplied: state.includes('Applied'),
                    };
                })
                "#,
            )
            .await
    }

    async fn open_posting(&self, posting_id: &str) -> Result<()> {
        let js = format!(
            r#"
            (() => {{
                const card = document.querySelector(`li[data-occludable-job-id="${{{id}}}"]`);
                const link = card?.querySelector('a.job-card-container__link');
                if (!link) return false;
                link.click();
                return true;
            }})()
            "#,
            id = serde_json::to_string(posting_id)?
        );
        let opened: bool = self.executor.eval_as(js).await?;
        if !opened {
            bail!("找不到职位卡片: {}", posting_id);
        }
        self.settle().await;
        Ok(())
    }

    async fn description_text(&self) -> Result<String> {
        self.executor
            .eval_as("document.querySelector('.jobs-description')?.textContent || ''")
            .await
    }

    async fn has_easy_apply(&self) -> Result<bool> {
        self.executor
            .eval_as(
                "(() => { const b = document.querySelector('button.jobs-apply-button'); return !!b && b.textContent.includes('Easy Apply'); })()",
            )
            .await
    }

    async fn open_easy_apply(&self) -> Result<()> {
        let clicked: bool = self
            .executor
            .eval_as(
                "(() => { const b = document.querySelector('button.jobs-apply-button'); if (!b) return false; b.click(); return true; })()",
            )
            .await?;
        if !clicked {
            bail!("Easy Apply 按钮消失");
        }
        self.settle().await;
        Ok(())
    }

    async fn modal_open(&self) -> Result<bool> {
        self.executor
            .eval_as(format!("!!document.querySelector('{MODAL}')"))
            .await
    }

    async fn visible_fields(&self) -> Result<Vec<FieldElement>> {
        let js = format!(
            r#"
            (() => {{
                const modal = document.querySelector('{MODAL}');
                if (!modal) return [];
                let seq = 0;
                const tag = el => {{
                    if (!el.getAttribute('{FIELD_ATTR}')) el.setAttribute('{FIELD_ATTR}', 'f' + (seq++) + '-' + Date.now());
                    return el.getAttribute('{FIELD_ATTR}');
                }};
                const text = el => el?.textContent?.trim() || null;
                const groupLabel = el => text(el.closest('.form-group, .fb-form-element, [data-test-form-element]')?.querySelector('label'));
                const fields = [];

                modal.querySelectorAll('input[type="text"], input[type="number"], input[type="tel"], input[type="email"], input[type="url"], textarea').forEach(el => {{
                    fields.push({{
                        id: tag(el),
                        kind: el.tagName === 'TEXTAREA' ? 'textarea' : 'text',
                        groupLabel: groupLabel(el),
                        ariaLabel: el.getAttribute('aria-label'),
                        placeholder: el.getAttribute('placeholder'),
                        legend: null,
                        options: [],
                        hasValue: !!el.value,
                    }});
                }});

                modal.querySelectorAll('select').forEach(el => {{
                    const options = [...el.querySelectorAll('option')]
                        .filter(o => o.value && !o.textContent.includes('Select'))
                        .map(o => o.textContent.trim());
                    fields.push({{
                        id: tag(el),
                        kind: 'select',
                        groupLabel: groupLabel(el),
                        ariaLabel: el.getAttribute('aria-label'),
                        placeholder: null,
                        legend: null,
                        options,
                        hasValue: !!el.value && el.value !== 'Select an option',
                    }});
                }});

                modal.querySelectorAll('fieldset').forEach(group => {{
                    const radios = [...group.querySelectorAll('input[type="radio"]')];
                    if (radios.length === 0) return;
                    fields.push({{
                        id: tag(group),
                        kind: 'radio',
                        groupLabel: null,
                        ariaLabel: group.getAttribute('aria-label'),
                        placeholder: null,
                        legend: text(group.querySelector('legend')),
                        options: radios.map(r => text(modal.querySelector(`label[for="${{r.id}}"]`)) || r.value),
                        hasValue: radios.some(r => r.checked),
                    }});
                }});

                modal.querySelectorAll('input[type="checkbox"]').forEach(el => {{
                    fields.push({{
                        id: tag(el),
                        kind: 'checkbox',
                        groupLabel: text(el.closest('label, .form-group')) || text(modal.querySelector(`label[for="${{el.id}}"]`)),
                        ariaLabel: el.getAttribute('aria-label'),
                        placeholder: null,
                        legend: text(el.closest('fieldset')?.querySelector('legend')),
                        options: [],
                        hasValue: el.checked,
                    }});
                }});

                return fields;
            }})()
            "#
        );
        self.executor.eval_as(js).await
    }

    async fn write_field(&self, field_id: &str, write: &FieldWrite) -> Result<()> {
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector(`[{FIELD_ATTR}="${{{id}}}"]`);
                if (!el) return {{ ok: false, error: 'field not found' }};
                const write = {write};
                switch (write.type) {{
                    case 'setText': {{
                        const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
                        Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, write.value);
                        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return {{ ok: true }};
                    }}
                    case 'selectOption': {{
                        const option = [...el.querySelectorAll('option')].find(o => o.textContent.trim() === write.value);
                        if (!option) return {{ ok: false, error: 'option not found' }};
                        el.value = option.value;
                        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return {{ ok: true }};
                    }}
                    case 'chooseRadio': {{
                        const radio = [...el.querySelectorAll('input[type="radio"]')].find(r => {{
                            const label = document.querySelector(`label[for="${{r.id}}"]`)?.textContent?.trim() || r.value;
                            return label === write.value;
                        }});
                        if (!radio) return {{ ok: false, error: 'radio option not found' }};
                        radio.click();
                        return {{ ok: true }};
                    }}
                    case 'check': {{
                        if (!el.checked) el.click();
                        return {{ ok: true }};
                    }}
                }}
                return {{ ok: false, error: 'unknown write' }};
            }})()
            "#,
            id = serde_json::to_string(field_id)?,
            write = serde_json::to_string(write)?
        );

        let result: ActionResult = self.executor.eval_as(js).await?;
        if !result.ok {
            bail!(
                "写入字段 {} 失败: {}",
                field_id,
                result.error.unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn has_control(&self, role: ControlRole) -> Result<bool> {
        self.executor
            .eval_as(format!("!!{}", Self::control_finder(role)))
            .await
    }

    async fn click_control(&self, role: ControlRole) -> Result<()> {
        let js = format!(
            "(() => {{ const b = {}; if (!b) return {{ ok: false, error: 'control not found' }}; b.click(); return {{ ok: true }}; }})()",
            Self::control_finder(role)
        );
        let result: ActionResult = self.executor.eval_as(js).await?;
        if !result.ok {
            bail!("点击 {:?} 失败: {}", role, result.error.unwrap_or_default());
        }
        self.settle().await;
        Ok(())
    }

    async fn next_results_page(&self) -> Result<bool> {
        let moved: bool = self
            .executor
            .eval_as(
                r#"
                (() => {
                    const pagination = document.querySelector('.jobs-search-pagination, .artdeco-pagination');
                    if (!pagination) return false;
                    const current = pagination.querySelector('button[aria-current="true"], button.active');
                    const currentNum = parseInt(current?.textContent) || 1;
                    const next = pagination.querySelector(`button[aria-label="Page ${currentNum + 1}"]`);
                    if (!next) return false;
                    next.click();
                    return true;
                })()
                "#,
            )
            .await?;
        if moved {
            self.settle().await;
        }
        Ok(moved)
    }
}
