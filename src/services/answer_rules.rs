//! 静态规则表 - 第一层答案来源
//!
//! 同步、确定、不调用任何外部服务

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Profile;

/// 规则命中的个人资料字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Phone,
    LinkedinUrl,
    WebsiteUrl,
    YearsExperience,
}

impl ProfileField {
    fn value(self, profile: &Profile) -> Option<String> {
        let value = match self {
            ProfileField::Phone => profile.phone.clone(),
            ProfileField::LinkedinUrl => profile.linkedin_url.clone(),
            ProfileField::WebsiteUrl => profile.website_url.clone(),
            ProfileField::YearsExperience => profile.years_experience?.to_string(),
        };
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

/// 按顺序匹配，先命中者优先
static RULES: LazyLock<Vec<(ProfileField, Regex)>> = LazyLock::new(|| {
    [
        (ProfileField::Phone, r"\b(phone|mobile|cell)\b"),
        (ProfileField::LinkedinUrl, r"linkedin"),
        (
            ProfileField::WebsiteUrl,
            r"\b(website|portfolio|github|personal site)\b",
        ),
        (
            ProfileField::YearsExperience,
            r"\bhow many years\b|\b(years?|yrs)\b.*\bexperience\b|\bexperience\b.*\b(years?|yrs)\b",
        ),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).expect("static rule pattern")))
    .collect()
});

static COVER_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cover\s*letter").expect("static cover letter pattern"));

static AGREEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"agree|terms|acknowledge").expect("static agreement pattern")
});

/// 将问题归类到个人资料字段
pub fn classify(question: &str) -> Option<ProfileField> {
    let question = question.to_lowercase();
    RULES
        .iter()
        .find(|(_, re)| re.is_match(&question))
        .map(|(field, _)| *field)
}

/// 第一层：命中规则且资料中有值时返回答案
pub fn lookup(question: &str, profile: &Profile) -> Option<String> {
    classify(question)?.value(profile)
}

/// 是否为求职信问题
pub fn is_cover_letter_question(question: &str) -> bool {
    COVER_LETTER.is_match(&question.to_lowercase())
}

/// 复选框是否像是同意条款 / 确认声明（启发式，可能误判）
pub fn is_agreement_label(label: &str) -> bool {
    AGREEMENT.is_match(&label.to_lowercase())
}
