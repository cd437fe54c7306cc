//! 职位资格判断
//!
//! 从职位描述中推断最低经验年限

use std::sync::LazyLock;

use regex::Regex;

static YEARS_REQUIRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)").expect("static experience pattern")
});

/// 描述中第一个 "N+ years" 形式的年限，找不到时返回 `None`（视为符合条件）
pub fn required_years(description: &str) -> Option<u32> {
    YEARS_REQUIRED
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 经验要求是否超出设置的上限
pub fn exceeds_experience(description: &str, max_years: u32) -> Option<u32> {
    required_years(description).filter(|required| *required > max_years)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_years() {
        assert_eq!(required_years("We need 7+ years of Rust"), Some(7));
        assert_eq!(required_years("3 yrs experience with Kubernetes"), Some(3));
        assert_eq!(required_years("At least 5 Years in backend"), Some(5));
        assert_eq!(required_years("No experience required"), None);
        assert_eq!(required_years(""), None);
    }

    #[test]
    fn test_exceeds_experience() {
        assert_eq!(exceeds_experience("7+ years", 5), Some(7));
        assert_eq!(exceeds_experience("7+ years", 10), None);
        assert_eq!(exceeds_experience("5+ years", 5), None);
        assert_eq!(exceeds_experience("fresh graduates welcome", 0), None);
    }
}
