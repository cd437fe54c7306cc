//! 申请上下文
//!
//! 封装"我正在申请哪个职位，本次申请已经回答了什么"

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use crate::models::Posting;

/// 单个职位的申请上下文
#[derive(Debug, Clone)]
pub struct ApplicationCtx {
    pub posting: Posting,

    /// 职位序号（仅用于日志显示，从1开始）
    pub posting_index: usize,

    /// 本次申请中已经给出的答案（问题 -> 答案）
    pub prior_answers: BTreeMap<String, String>,

    /// 已处理过的字段 id，留空的字段也算在内
    attempted_fields: HashSet<String>,
}

impl ApplicationCtx {
    pub fn new(posting: Posting, posting_index: usize) -> Self {
        Self {
            posting,
            posting_index,
            prior_answers: BTreeMap::new(),
            attempted_fields: HashSet::new(),
        }
    }

    pub fn remember(&mut self, question: &str, answer: &str) {
        self.prior_answers
            .insert(question.to_string(), answer.to_string());
    }

    /// 标记字段为已处理；之前处理过则返回 `false`
    pub fn first_attempt(&mut self, field_id: &str) -> bool {
        self.attempted_fields.insert(field_id.to_string())
    }
}

impl Display for ApplicationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[职位 {}]", self.posting_index)
    }
}
