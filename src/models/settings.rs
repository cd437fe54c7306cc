//! 求职设置
//!
//! 一次运行开始时加载，运行期间视为不可变；运行中收到的更新只影响之后的职位。

use serde::{Deserialize, Serialize};

/// 职位发布时间筛选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePosted {
    #[default]
    Any,
    Day,
    Week,
    Month,
}

impl DatePosted {
    /// 页面上对应的筛选项文字
    pub fn label(self) -> Option<&'static str> {
        match self {
            DatePosted::Any => None,
            DatePosted::Day => Some("Past 24 hours"),
            DatePosted::Week => Some("Past week"),
            DatePosted::Month => Some("Past month"),
        }
    }
}

/// 求职信风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverLetterStyle {
    #[default]
    Professional,
    Friendly,
    Concise,
    Detailed,
}

impl CoverLetterStyle {
    pub fn guide(self) -> &'static str {
        match self {
            CoverLetterStyle::Professional => {
                "Write in a formal, professional tone. Use standard business letter format."
            }
            CoverLetterStyle::Friendly => {
                "Write in a warm, conversational tone while remaining professional. Show personality."
            }
            CoverLetterStyle::Concise => {
                "Keep it brief - maximum 150 words. Focus on key qualifications only."
            }
            CoverLetterStyle::Detailed => {
                "Provide a comprehensive letter addressing all major requirements. Include specific examples."
            }
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            CoverLetterStyle::Concise => 300,
            _ => 800,
        }
    }
}

/// 静态个人资料（第一层答案来源）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub phone: String,
    pub linkedin_url: String,
    pub website_url: String,
    pub years_experience: Option<u32>,
    pub resume_text: String,
}

/// 搜索结果页筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilters {
    pub easy_apply_only: bool,
    pub date_posted: DatePosted,
}

/// 进程级求职设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// 搜索关键词，启动时不在搜索页则据此打开搜索结果
    pub search_terms: Vec<String>,
    pub search_location: String,
    pub max_experience_years: u32,
    pub excluded_title_words: Vec<String>,
    pub excluded_companies: Vec<String>,
    pub easy_apply_only: bool,
    pub date_posted: DatePosted,
    pub delay_between_postings_ms: u64,
    pub max_applications: u32,
    pub use_answer_service: bool,
    pub pause_before_submit: bool,
    pub pause_for_unknown_field: bool,
    pub generate_cover_letter: bool,
    /// 生成的求职信是否需要人工确认
    pub review_cover_letter: bool,
    pub cover_letter_style: CoverLetterStyle,
    /// 设置后，职位匹配分低于该值会被跳过
    pub min_match_score: Option<u8>,
    pub additional_instructions: String,
    pub profile: Profile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_terms: Vec::new(),
            search_location: String::new(),
            max_experience_years: 10,
            excluded_title_words: Vec::new(),
            excluded_companies: Vec::new(),
            easy_apply_only: true,
            date_posted: DatePosted::Any,
            delay_between_postings_ms: 3000,
            max_applications: 50,
            use_answer_service: true,
            pause_before_submit: false,
            pause_for_unknown_field: true,
            generate_cover_letter: false,
            review_cover_letter: false,
            cover_letter_style: CoverLetterStyle::Professional,
            min_match_score: None,
            additional_instructions: String::new(),
            profile: Profile::default(),
        }
    }
}

impl Settings {
    /// 由关键词和地点拼出的职位搜索地址，没有关键词时返回 `None`
    pub fn search_url(&self) -> Option<String> {
        let keywords = self
            .search_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if keywords.is_empty() {
            return None;
        }

        Some(format!(
            "https://www.linkedin.com/jobs/search/?keywords={}&location={}",
            urlencoding::encode(&keywords),
            urlencoding::encode(self.search_location.trim())
        ))
    }

    pub fn search_filters(&self) -> SearchFilters {
        SearchFilters {
            easy_apply_only: self.easy_apply_only,
            date_posted: self.date_posted,
        }
    }

    /// 标题或公司是否命中排除列表（不区分大小写的子串匹配）
    pub fn is_excluded(&self, title: &str, company: &str) -> bool {
        let title = title.to_lowercase();
        let company = company.to_lowercase();

        let hit = |terms: &[String], haystack: &str| {
            terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .any(|t| haystack.contains(&t))
        };

        hit(&self.excluded_title_words, &title) || hit(&self.excluded_companies, &company)
    }
}
