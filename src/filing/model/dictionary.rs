//! 情感词典条目

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityFlags {
    pub negative: bool,
    pub positive: bool,
}

impl PolarityFlags {
    pub fn any(&self) -> bool {
        self.negative || self.positive
    }
}

/// 词典中的一个词，单词统一为大写。词集合即所有矩阵的列空间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub sequence_number: u64,
    pub word_count: u64,
    pub polarity: PolarityFlags,
}
