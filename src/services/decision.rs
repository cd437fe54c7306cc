//! 决策服务接口
//!
//! 自动化驱动把需要"判断"的事情（回答问题、写求职信、分析职位）
//! 委托给决策服务。具体实现见 [`crate::services::LlmService`]。

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{CoverLetterStyle, ElementKind};

/// answerQuestion 请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question: String,
    pub element_kind: ElementKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub prior_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub additional_instructions: String,
}

/// answerQuestion 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionAnswer {
    Answer(String),
    NeedInput(String),
}

/// generateCoverLetter 请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub title: String,
    pub company: String,
    pub job_description: String,
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub style: CoverLetterStyle,
    #[serde(default)]
    pub additional_instructions: String,
}

/// analyzeJob 响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobAnalysis {
    pub match_score: u8,
    pub key_requirements: Vec<String>,
    pub my_matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub keywords: Vec<String>,
    pub tips: String,
}

/// 决策服务
///
/// 调用方可以安全地重试，但答案解析器对每个字段最多调用一次
#[async_trait]
pub trait DecisionService: Send + Sync {
    async fn answer_question(&self, request: &AnswerRequest) -> Result<DecisionAnswer>;

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<String>;

    async fn analyze_job(&self, job_description: &str, resume_text: &str) -> Result<JobAnalysis>;
}
