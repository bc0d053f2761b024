//! 分词：去掉残留标记和非字母数字字符，转大写后按空白切分

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").expect("markup pattern"));
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("non-alnum pattern"));

pub fn tokenize(text: &str) -> Vec<String> {
    let text = MARKUP.replace_all(text, "");
    let text = NON_ALNUM.replace_all(&text, " ");
    text.to_ascii_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 单个文档的词频
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub counts: HashMap<String, u64>,
    /// 全部词数（含词表外的词），即文档长度
    pub total: u64,
}

impl TokenCounts {
    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }
}

pub fn count_tokens(text: &str) -> TokenCounts {
    let mut result = TokenCounts::default();
    for token in tokenize(text) {
        *result.counts.entry(token).or_insert(0) += 1;
        result.total += 1;
    }
    result
}
