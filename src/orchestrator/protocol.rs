//! 消息协议
//!
//! 请求 / 响应按 `action` 名称对应，没有持久连接。
//! 控制台既接受原始 JSON 请求，也接受简写命令（见 [`parse_command`]）。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ApplicationOutcome, Posting, RunState, Settings, Stats};
use crate::services::decision::{AnswerRequest, CoverLetterRequest, JobAnalysis};
use crate::services::state_store::LogEntry;
use crate::services::ReviewDecision;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Start,
    Stop,
    Pause,
    Resume,
    GetState,
    GetStats,
    GetLogs,
    ClearLogs,
    SettingsUpdated {
        settings: Settings,
    },
    AnswerQuestion(AnswerRequest),
    GenerateCoverLetter(CoverLetterRequest),
    AnalyzeJob {
        #[serde(rename = "jobDescription")]
        job_description: String,
    },
    /// 挂起直到 provideUserInput / skipUserInput
    NeedUserInput {
        question: String,
    },
    ProvideUserInput {
        answer: String,
    },
    SkipUserInput,
    ReviewCoverLetter {
        decision: ReviewDecision,
    },
    ApplicationOutcome {
        posting: Posting,
        outcome: ApplicationOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack {
        ok: bool,
    },
    State(RunState),
    Stats(Stats),
    Logs {
        logs: Vec<LogEntry>,
    },
    Answer {
        answer: String,
    },
    NeedInput {
        #[serde(rename = "needInput")]
        need_input: bool,
        reason: String,
    },
    CoverLetter {
        #[serde(rename = "coverLetter")]
        cover_letter: String,
    },
    Analysis(JobAnalysis),
    UserInput {
        answer: Option<String>,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn ack(ok: bool) -> Self {
        Response::Ack { ok }
    }

    pub fn need_input(reason: impl Into<String>) -> Self {
        Response::NeedInput {
            need_input: true,
            reason: reason.into(),
        }
    }

    pub fn error(err: &anyhow::Error) -> Self {
        Response::Error {
            error: format!("{:#}", err),
        }
    }
}

/// 解析控制台输入：简写命令或 JSON 请求
pub fn parse_command(line: &str) -> Result<Request> {
    let line = line.trim();
    if line.starts_with('{') {
        return serde_json::from_str(line).context("无法解析 JSON 请求");
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    Ok(match word.to_lowercase().as_str() {
        "start" => Request::Start,
        "stop" => Request::Stop,
        "pause" => Request::Pause,
        "resume" => Request::Resume,
        "state" => Request::GetState,
        "stats" => Request::GetStats,
        "logs" => Request::GetLogs,
        "clear-logs" => Request::ClearLogs,
        "answer" if !rest.is_empty() => Request::ProvideUserInput {
            answer: rest.to_string(),
        },
        "skip" => Request::SkipUserInput,
        "approve" => Request::ReviewCoverLetter {
            decision: ReviewDecision::Approve,
        },
        "regenerate" => Request::ReviewCoverLetter {
            decision: ReviewDecision::Regenerate,
        },
        _ => bail!("未知命令: {}", line),
    })
}
