//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：连接（或启动）浏览器、创建 JsExecutor / 页面访问层 / LLM 服务
//! 2. **设置加载**：TOML 设置文件 → 持久化存储 → 默认值
//! 3. **控制台**：从标准输入读取命令，交给 [`SessionController::handle`]
//! 4. **资源管理**：持有 Browser，确保整个运行期间连接有效

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{load_settings, RunState, Settings};
use crate::orchestrator::protocol::parse_command;
use crate::orchestrator::session::{EngineOptions, SessionController};
use crate::page::ChromeJobPage;
use crate::services::{LlmService, StateStore};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    _browser: Browser,
    controller: Arc<SessionController>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = if config.headless {
            browser::launch_headless_browser(&config.target_url).await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                &config.target_url,
                Some("linkedin.com/jobs"),
            )
            .await?
        };

        let executor = JsExecutor::new(page);
        let settle_delay = Duration::from_millis(config.settle_delay_ms);
        let job_page = Arc::new(ChromeJobPage::new(executor, settle_delay));
        let decision = Arc::new(LlmService::new(&config));

        let store = StateStore::load(&config.state_file)
            .with_context(|| format!("无法加载状态文件: {}", config.state_file))?;
        let settings = resolve_settings(Path::new(&config.settings_file), &store).await?;

        let controller = SessionController::new(
            job_page,
            decision,
            settings,
            store,
            EngineOptions {
                max_steps: config.max_steps,
                settle_delay,
            },
        );

        Ok(Self {
            _browser: browser,
            controller: Arc::new(controller),
        })
    }

    /// 运行应用主逻辑
    ///
    /// 启动一次会话，然后持续接受控制台命令，直到标准输入关闭或 Ctrl-C
    pub async fn run(self) -> Result<()> {
        tokio::spawn(announce_prompts(self.controller.subscribe()));
        let console = tokio::spawn(console_loop(self.controller.clone()));

        if !self.controller.start().await {
            warn!("⚠️ 会话未启动，准备好后在控制台输入 start");
        }

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("无法监听 Ctrl-C")?;
                info!("收到 Ctrl-C，正在停止...");
            }
            _ = console => {
                info!("控制台输入已关闭，正在停止...");
            }
        }

        self.controller.stop();
        self.controller.wait_finished().await;
        info!("👋 已退出");
        Ok(())
    }
}

/// 设置来源：TOML 文件优先，其次是上次保存的设置，最后是默认值
async fn resolve_settings(settings_file: &Path, store: &StateStore) -> Result<Settings> {
    if let Some(settings) = load_settings(settings_file).await? {
        if let Err(e) = store.save_settings(&settings) {
            warn!("⚠️ 保存设置失败: {}", e);
        }
        return Ok(settings);
    }

    match store.settings() {
        Some(settings) => {
            info!("使用上次保存的设置");
            Ok(settings)
        }
        None => {
            warn!(
                "⚠️ 未找到设置文件 {}，使用默认设置",
                settings_file.display()
            );
            Ok(Settings::default())
        }
    }
}

/// 控制台：每行一个命令，响应以 JSON 打印
async fn console_loop(controller: Arc<SessionController>) {
    info!("⌨️ 控制台命令: start / pause / resume / stop / state / stats / logs / clear-logs / answer <内容> / skip / approve / regenerate");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("⚠️ 读取控制台输入失败: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_command(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("⚠️ {:#}", e);
                continue;
            }
        };

        // needUserInput 会一直挂起，不能阻塞后续命令
        let controller = controller.clone();
        tokio::spawn(async move {
            let response = controller.handle(request).await;
            match serde_json::to_string(&response) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("⚠️ 无法序列化响应: {}", e),
            }
        });
    }
}

/// 出现新的待回答问题时提示用户
async fn announce_prompts(mut state: watch::Receiver<RunState>) {
    let mut last_question: Option<String> = None;
    while state.changed().await.is_ok() {
        let pending = state.borrow_and_update().pending_question.clone();
        if pending != last_question {
            if let Some(question) = &pending {
                info!("❓ 等待输入: {}", question);
                info!("   输入 `answer <内容>` 回答，`skip` 跳过；求职信可用 approve / regenerate / skip");
            }
            last_question = pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settings_file_wins_over_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        tokio::fs::write(&path, "maxApplications = 4\n").await.unwrap();
        let store = StateStore::in_memory();
        store
            .save_settings(&Settings {
                max_applications: 9,
                ..Settings::default()
            })
            .unwrap();

        let settings = resolve_settings(&path, &store).await.unwrap();

        assert_eq!(settings.max_applications, 4);
        assert_eq!(store.settings().unwrap().max_applications, 4);
    }

    #[tokio::test]
    async fn test_falls_back_to_store_then_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        let store = StateStore::in_memory();
        assert_eq!(resolve_settings(&missing, &store).await.unwrap(), Settings::default());

        store
            .save_settings(&Settings {
                max_applications: 9,
                ..Settings::default()
            })
            .unwrap();
        assert_eq!(resolve_settings(&missing, &store).await.unwrap().max_applications, 9);
    }
}
