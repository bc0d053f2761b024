//! 情感词典加载
//!
//! 按表头名定位列（大小写、空格、下划线不敏感），因此完整的 Loughran-McDonald
//! 主词典与只含五列的精简版都能直接读取。标记列非空且非零即为真。

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, DictionaryRowError};
use crate::filing::model::{DictionaryEntry, PolarityFlags};

/// 词表范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VocabularyScope {
    /// 词典中的全部单词
    #[default]
    All,
    /// 只保留带正面或负面标记的单词
    Polarity,
}

impl FromStr for VocabularyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(VocabularyScope::All),
            "polarity" | "sentiment" => Ok(VocabularyScope::Polarity),
            other => Err(format!("未知的 VOCABULARY_SCOPE: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VocabularyLoadReport {
    pub rows: usize,
    pub loaded: usize,
    pub malformed: usize,
    pub duplicates: usize,
    /// 因范围限制被排除的单词
    pub excluded: usize,
}

/// 固定词表，列号即条目下标
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<DictionaryEntry>,
    index: HashMap<String, usize>,
}

struct ColumnLayout {
    word: usize,
    sequence_number: Option<usize>,
    word_count: Option<usize>,
    negative: usize,
    positive: usize,
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn find_column(names: &[String], candidates: &[&str]) -> Option<usize> {
    names.iter().position(|n| candidates.contains(&n.as_str()))
}

fn require_column(names: &[String], candidates: &[&str]) -> AppResult<usize> {
    find_column(names, candidates).ok_or_else(|| AppError::Config(format!("词典缺少列: {}", candidates[0])))
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> AppResult<Self> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        Ok(Self {
            word: require_column(&names, &["word"])?,
            sequence_number: find_column(&names, &["sequencenumber"]),
            word_count: find_column(&names, &["wordcount"]),
            negative: require_column(&names, &["negative", "negativeflag"])?,
            positive: require_column(&names, &["positive", "positiveflag"])?,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<DictionaryEntry, DictionaryRowError> {
        let word = record.get(self.word).unwrap_or("").trim().to_uppercase();
        if word.is_empty() {
            return Err(DictionaryRowError::EmptyWord);
        }
        Ok(DictionaryEntry {
            word,
            sequence_number: parse_count(record, self.sequence_number, "sequence_number")?,
            word_count: parse_count(record, self.word_count, "word_count")?,
            polarity: PolarityFlags {
                negative: parse_flag(record, self.negative, "negative")?,
                positive: parse_flag(record, self.positive, "positive")?,
            },
        })
    }
}

fn parse_count(
    record: &csv::StringRecord,
    column: Option<usize>,
    field: &'static str,
) -> Result<u64, DictionaryRowError> {
    let raw = column.and_then(|c| record.get(c)).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u64>().map_err(|_| DictionaryRowError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_flag(record: &csv::StringRecord, column: usize, field: &'static str) -> Result<bool, DictionaryRowError> {
    let raw = record.get(column).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(false);
    }
    raw.parse::<f64>()
        .map(|v| v != 0.0)
        .map_err(|_| DictionaryRowError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

impl Vocabulary {
    /// 由条目构造，重复单词保留首次出现
    pub fn from_entries(entries: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        let mut vocabulary = Self::default();
        for entry in entries {
            vocabulary.push(entry);
        }
        vocabulary
    }

    fn push(&mut self, entry: DictionaryEntry) -> bool {
        if self.index.contains_key(&entry.word) {
            return false;
        }
        self.index.insert(entry.word.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// 从词典文件加载，文件缺失属于致命配置错误
    pub fn load(path: &Path, scope: VocabularyScope) -> AppResult<(Self, VocabularyLoadReport)> {
        if !path.is_file() {
            return Err(AppError::Config(format!("情感词典不存在: {}", path.display())));
        }
        let (vocabulary, report) = Self::from_reader(File::open(path)?, scope)?;
        info!(
            "📖 词典加载完成: {} 个单词 (坏行 {}, 重复 {}, 排除 {}), 来源 {}",
            report.loaded,
            report.malformed,
            report.duplicates,
            report.excluded,
            path.display()
        );
        Ok((vocabulary, report))
    }

    pub fn from_reader<R: Read>(reader: R, scope: VocabularyScope) -> AppResult<(Self, VocabularyLoadReport)> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let layout = ColumnLayout::from_headers(reader.headers()?)?;

        let mut vocabulary = Self::default();
        let mut report = VocabularyLoadReport::default();
        for record in reader.records() {
            report.rows += 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!("词典行读取失败 {}: {}", report.rows, e);
                    report.malformed += 1;
                    continue;
                }
            };
            let entry = match layout.parse(&record) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("丢弃词典坏行 {}: {}", report.rows, e);
                    report.malformed += 1;
                    continue;
                }
            };
            if scope == VocabularyScope::Polarity && !entry.polarity.any() {
                report.excluded += 1;
                continue;
            }
            if !vocabulary.push(entry) {
                report.duplicates += 1;
            }
        }
        report.loaded = vocabulary.len();
        Ok((vocabulary, report))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 单词对应的列号（单词需已大写）
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.word.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "\
Word,Sequence Number,Word Count,Word Proportion,Negative,Positive,Uncertainty
ABANDON,1,123,1.2e-06,2009,0,0
able,2,500,3.1e-05,0,0,0
GOOD,3,900,4.0e-05,0,2009,0
,4,1,0,0,0,0
BAD,x,10,0,2009,0,0
abandon,5,7,0,2009,0,0
";

    #[test]
    fn test_load_all_words_uppercased() {
        let (vocab, report) = Vocabulary::from_reader(MASTER.as_bytes(), VocabularyScope::All).unwrap();
        assert_eq!(vocab.words().collect::<Vec<_>>(), vec!["ABANDON", "ABLE", "GOOD"]);
        assert_eq!(report.rows, 6);
        assert_eq!(report.malformed, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(vocab.index_of("GOOD"), Some(2));
        assert!(vocab.entries()[0].polarity.negative);
        assert_eq!(vocab.entries()[0].word_count, 123);
    }

    #[test]
    fn test_polarity_scope_filters_neutral_words() {
        let (vocab, report) = Vocabulary::from_reader(MASTER.as_bytes(), VocabularyScope::Polarity).unwrap();
        assert_eq!(vocab.words().collect::<Vec<_>>(), vec!["ABANDON", "GOOD"]);
        assert_eq!(report.excluded, 1);
    }

    #[test]
    fn test_short_header_and_missing_columns() {
        let short = "word,sequence_number,word_count,negative_flag,positive_flag\nloss,1,1,1,0\n";
        let (vocab, _) = Vocabulary::from_reader(short.as_bytes(), VocabularyScope::All).unwrap();
        assert_eq!(vocab.len(), 1);

        let err = Vocabulary::from_reader("word,count\nx,1\n".as_bytes(), VocabularyScope::All).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vocabulary::load(&dir.path().join("none.csv"), VocabularyScope::All).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
