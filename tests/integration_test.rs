use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use easy_apply_bot::browser::connect_to_browser_and_page;
use easy_apply_bot::config::Config;
use easy_apply_bot::models::{ElementKind, FieldElement, FieldWrite, Posting, SearchFilters};
use easy_apply_bot::orchestrator::EngineOptions;
use easy_apply_bot::page::{ChromeJobPage, ControlRole, JobPage};
use easy_apply_bot::services::decision::{
    AnswerRequest, CoverLetterRequest, DecisionAnswer, DecisionService, JobAnalysis,
};
use easy_apply_bot::services::{LlmService, StateStore};
use easy_apply_bot::utils::logging;
use easy_apply_bot::{parse_command, JsExecutor, Response, RunStatus, SessionController, Settings};

/// 只有一个结果页、一个职位、一步即可提交的页面
#[derive(Default)]
struct OneClickPage {
    modal_open: std::sync::Mutex<bool>,
}

#[async_trait]
impl JobPage for OneClickPage {
    async fn is_job_search_page(&self) -> Result<bool> {
        Ok(true)
    }
    async fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }
    async fn apply_filters(&self, _filters: &SearchFilters) -> Result<()> {
        Ok(())
    }
    async fn list_postings(&self) -> Result<Vec<Posting>> {
        Ok(vec![Posting {
            id: "1".to_string(),
            title: "Rust Engineer".to_string(),
            company: "Initech".to_string(),
            description_text: String::new(),
            already_applied: false,
        }])
    }
    async fn open_posting(&self, _posting_id: &str) -> Result<()> {
        Ok(())
    }
    async fn description_text(&self) -> Result<String> {
        Ok("2+ years of Rust".to_string())
    }
    async fn has_easy_apply(&self) -> Result<bool> {
        Ok(true)
    }
    async fn open_easy_apply(&self) -> Result<()> {
        *self.modal_open.lock().unwrap() = true;
        Ok(())
    }
    async fn modal_open(&self) -> Result<bool> {
        Ok(*self.modal_open.lock().unwrap())
    }
    async fn visible_fields(&self) -> Result<Vec<FieldElement>> {
        Ok(Vec::new())
    }
    async fn write_field(&self, _field_id: &str, _write: &FieldWrite) -> Result<()> {
        Ok(())
    }
    async fn has_control(&self, role: ControlRole) -> Result<bool> {
        Ok(role == ControlRole::Submit && *self.modal_open.lock().unwrap())
    }
    async fn click_control(&self, role: ControlRole) -> Result<()> {
        if role == ControlRole::Submit {
            *self.modal_open.lock().unwrap() = false;
        }
        Ok(())
    }
    async fn next_results_page(&self) -> Result<bool> {
        Ok(false)
    }
}

struct SilentDecision;

#[async_trait]
impl DecisionService for SilentDecision {
    async fn answer_question(&self, _request: &AnswerRequest) -> Result<DecisionAnswer> {
        Ok(DecisionAnswer::NeedInput("offline".to_string()))
    }
    async fn generate_cover_letter(&self, _request: &CoverLetterRequest) -> Result<String> {
        Ok(String::new())
    }
    async fn analyze_job(&self, _job_description: &str, _resume_text: &str) -> Result<JobAnalysis> {
        Ok(JobAnalysis::default())
    }
}

#[tokio::test]
async fn test_console_commands_drive_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");
    let controller = SessionController::new(
        Arc::new(OneClickPage::default()),
        Arc::new(SilentDecision),
        Settings {
            delay_between_postings_ms: 0,
            ..Settings::default()
        },
        StateStore::load(&state_file).unwrap(),
        EngineOptions {
            max_steps: 3,
            settle_delay: Duration::ZERO,
        },
    );

    let response = controller.handle(parse_command("start").unwrap()).await;
    assert_eq!(response, Response::ack(true));
    controller.wait_finished().await;

    match controller.handle(parse_command("state").unwrap()).await {
        Response::State(state) => {
            assert_eq!(state.status, RunStatus::Idle);
            assert_eq!(state.applied_count, 1);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    // 持久化的统计在重新加载后仍然存在
    let reloaded = StateStore::load(&state_file).unwrap();
    assert_eq!(reloaded.stats().applied, 1);
    assert_eq!(reloaded.applied_history()[0].company, "Initech");
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_job_search_page() {
    let _ = logging::init(true);
    let config = Config::from_env();

    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        Some("linkedin.com/jobs"),
    )
    .await
    .expect("连接浏览器失败");

    let job_page = ChromeJobPage::new(
        JsExecutor::new(page),
        Duration::from_millis(config.settle_delay_ms),
    );
    assert!(job_page.is_job_search_page().await.unwrap());

    let postings = job_page.list_postings().await.unwrap();
    println!("当前页共 {} 个职位", postings.len());
    for posting in postings.iter().take(5) {
        println!("  - {} (已申请: {})", posting, posting.already_applied);
    }
}

#[tokio::test]
#[ignore]
async fn test_llm_answers_question() {
    let _ = logging::init(true);
    let config = Config::from_env();
    let service = LlmService::new(&config);

    let answer = service
        .answer_question(&AnswerRequest {
            question: "How many years of experience do you have with Rust?".to_string(),
            element_kind: ElementKind::Text,
            options: Vec::new(),
            job_description: "Backend engineer, Rust and Postgres".to_string(),
            prior_answers: Default::default(),
            resume_text: "Software engineer, 4 years of Rust, 2 years of Go".to_string(),
            additional_instructions: String::new(),
        })
        .await
        .expect("LLM 调用失败");

    println!("LLM 回答: {:?}", answer);
}
