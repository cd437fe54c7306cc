//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::error::AppError;

/// JS 执行器
///
/// - 持有唯一的 Page
/// - 不认识职位 / 表单，只负责执行脚本
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 当前页面 URL
    pub async fn current_url(&self) -> Result<Option<String>> {
        let url = self.page.url().await.map_err(AppError::from)?;
        Ok(url)
    }

    /// 导航到指定地址并等待加载
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(AppError::from)
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    /// 执行 JS 表达式并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let js_code = js_code.into();
        trace!("执行脚本 ({} 字符)", js_code.len());

        let result = self
            .page
            .evaluate(js_code)
            .await
            .map_err(AppError::from)
            .context("页面脚本执行失败")?;

        // 表达式返回 undefined 时没有值，按 null 处理
        Ok(result.into_value().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 表达式并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value.clone())
            .with_context(|| format!("脚本返回值无法解析: {}", json_value))
    }
}
