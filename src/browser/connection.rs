use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AppError;

/// 连接到已打开的浏览器并获取职位页面
///
/// 优先复用 URL 中包含 `url_hint` 的已有标签页（用户通常已经登录并搜索好了），
/// 找不到时新建页面并导航到 `target_url`
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: &str,
    url_hint: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    if let Some(hint) = url_hint {
        for p in pages.iter() {
            if let Ok(Some(url)) = p.url().await {
                debug!("检查页面: {}", url);
                if url.contains(hint) {
                    info!("✓ 复用已打开的页面: {}", url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("未找到匹配的页面，将创建新页面");
    }

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    page.goto(target_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", target_url, e);
        e
    })?;
    info!("已导航到: {}", target_url);

    Ok((browser, page))
}
