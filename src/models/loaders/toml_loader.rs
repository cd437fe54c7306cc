use crate::error::ConfigError;
use crate::models::Settings;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载求职设置
///
/// 文件不存在时返回 `None`，由调用方决定回退到存储中的设置或默认值
pub async fn load_settings(toml_file_path: &Path) -> Result<Option<Settings>> {
    if !fs::try_exists(toml_file_path).await.unwrap_or(false) {
        tracing::debug!("设置文件不存在: {}", toml_file_path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取设置文件: {}", toml_file_path.display()))?;

    let settings: Settings =
        toml::from_str(&content).map_err(|source| ConfigError::SettingsParseFailed {
            path: toml_file_path.display().to_string(),
            source,
        })?;

    tracing::info!(
        "已加载设置文件: {} (最多申请 {} 个职位)",
        toml_file_path.display(),
        settings.max_applications
    );

    Ok(Some(settings))
}
