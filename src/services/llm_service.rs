//! LLM 服务 - 业务能力层
//!
//! 基于 `async-openai` 实现 [`DecisionService`]，兼容任何 OpenAI API 格式的服务。
//! 只负责构建 prompt、调用接口、解析返回，不关心申请流程。

use std::sync::LazyLock;

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, DecisionError};
use crate::models::ElementKind;
use crate::services::decision::{
    AnswerRequest, CoverLetterRequest, DecisionAnswer, DecisionService, JobAnalysis,
};
use crate::utils::logging::clip;

/// 模型无法回答时的回复前缀
const NEED_INPUT_PREFIX: &str = "NEED_INPUT:";

const RESUME_BUDGET: usize = 3000;
const ANSWER_DESCRIPTION_BUDGET: usize = 2000;
const COVER_LETTER_DESCRIPTION_BUDGET: usize = 3000;

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("static json pattern"));

/// LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用
    ///
    /// 其他所有 LLM 相关功能都基于此函数
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(
            "调用 LLM API，模型: {}，用户消息长度: {} 字符",
            self.model_name,
            user_message.len()
        );

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| DecisionError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl DecisionService for LlmService {
    async fn answer_question(&self, request: &AnswerRequest) -> Result<DecisionAnswer> {
        let (user_message, system_message) = build_answer_messages(request);
        let max_tokens = if request.element_kind == ElementKind::TextArea {
            500
        } else {
            200
        };

        let response = self
            .send_to_llm(&user_message, Some(&system_message), 0.3, max_tokens)
            .await?;

        Ok(parse_answer_response(&response))
    }

    async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<String> {
        let (user_message, system_message) = build_cover_letter_messages(request);
        self.send_to_llm(
            &user_message,
            Some(&system_message),
            0.7,
            request.style.max_tokens(),
        )
        .await
    }

    async fn analyze_job(&self, job_description: &str, resume_text: &str) -> Result<JobAnalysis> {
        let user_message = format!(
            r#"Analyze this job description and my resume. Identify:
1. Key requirements
2. Required skills I have
3. Skills I might be missing
4. Important keywords to use in responses

JOB DESCRIPTION:
{}

MY RESUME:
{}

Provide a brief analysis in JSON format:
{{
  "matchScore": 0-100,
  "keyRequirements": ["...", "..."],
  "myMatchingSkills": ["...", "..."],
  "missingSkills": ["...", "..."],
  "keywords": ["...", "..."],
  "tips": "Brief application tip"
}}"#,
            clip(job_description, COVER_LETTER_DESCRIPTION_BUDGET),
            clip(resume_text, RESUME_BUDGET)
        );

        let response = self
            .send_to_llm(
                &user_message,
                Some("You are an expert job application assistant. Analyze job descriptions and help candidates apply effectively."),
                0.3,
                1000,
            )
            .await?;

        Ok(parse_analysis_response(&response)?)
    }
}

/// 构建回答问题的消息，返回 (user_message, system_message)
fn build_answer_messages(request: &AnswerRequest) -> (String, String) {
    let mut system_message = format!(
        r#"You are helping someone apply for a job. Answer application questions concisely and professionally.

Rules:
- Be truthful and don't exaggerate
- Use information from the resume when available
- Match the tone to a job application
- For numeric questions, give just the number
- For yes/no questions, answer only "Yes" or "No"
- Keep answers concise unless it's a cover letter or detailed question
- If you absolutely cannot answer, respond with: "{} [reason]""#,
        NEED_INPUT_PREFIX
    );

    if !request.additional_instructions.is_empty() {
        system_message.push_str(&format!(
            "\n\nAdditional instructions from user: {}",
            request.additional_instructions
        ));
    }

    let mut user_message = format!(
        "Question: {}\nQuestion type: {}",
        request.question,
        request.element_kind.as_str()
    );

    if !request.options.is_empty() {
        user_message.push_str(&format!(
            "\nAvailable options: {}\nPlease select the most appropriate option from the list above.",
            request.options.join(", ")
        ));
    }

    if !request.resume_text.is_empty() {
        user_message.push_str(&format!(
            "\n\nMY RESUME/BACKGROUND:\n{}",
            clip(&request.resume_text, RESUME_BUDGET)
        ));
    }

    if !request.job_description.is_empty() {
        user_message.push_str(&format!(
            "\n\nJOB DESCRIPTION:\n{}",
            clip(&request.job_description, ANSWER_DESCRIPTION_BUDGET)
        ));
    }

    if !request.prior_answers.is_empty() {
        let prior = serde_json::to_string(&request.prior_answers).unwrap_or_default();
        user_message.push_str(&format!("\n\nPREVIOUS ANSWERS IN THIS APPLICATION:\n{}", prior));
    }

    user_message.push_str(
        "\n\nProvide ONLY the answer, no explanations. If selecting from options, give the exact option text.",
    );

    (user_message, system_message)
}

/// 构建求职信消息，返回 (user_message, system_message)
fn build_cover_letter_messages(request: &CoverLetterRequest) -> (String, String) {
    let system_message = format!(
        r#"You are an expert cover letter writer. Write compelling, personalized cover letters that help candidates stand out.

Style: {}

Rules:
- Personalize to the specific job and company
- Highlight relevant experience from the resume
- Show enthusiasm for the role
- Include a call to action
- Don't use generic phrases like "I am writing to apply for..."
- Don't lie or exaggerate"#,
        request.style.guide()
    );

    let instructions = if request.additional_instructions.is_empty() {
        String::new()
    } else {
        format!("ADDITIONAL INSTRUCTIONS: {}", request.additional_instructions)
    };

    let user_message = format!(
        r#"Write a cover letter for this position:

POSITION: {} at {}

JOB DESCRIPTION:
{}

MY RESUME:
{}

{}

Write the cover letter now:"#,
        request.title,
        request.company,
        clip(&request.job_description, COVER_LETTER_DESCRIPTION_BUDGET),
        clip(&request.resume_text, RESUME_BUDGET),
        instructions
    );

    (user_message, system_message)
}

/// 解析回答：`NEED_INPUT: 原因` 表示模型无法回答
fn parse_answer_response(response: &str) -> DecisionAnswer {
    let response = response.trim();
    match response.strip_prefix(NEED_INPUT_PREFIX) {
        Some(reason) => DecisionAnswer::NeedInput(reason.trim().to_string()),
        None if response.is_empty() => DecisionAnswer::NeedInput("empty answer".to_string()),
        None => DecisionAnswer::Answer(response.to_string()),
    }
}

/// 从回复中提取 JSON 对象并解析
fn parse_analysis_response(response: &str) -> Result<JobAnalysis, DecisionError> {
    JSON_OBJECT
        .find(response)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
        .ok_or_else(|| DecisionError::AnalysisParseFailed {
            response: response.to_string(),
        })
}
