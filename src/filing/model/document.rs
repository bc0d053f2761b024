//! 文档标识与文档内容

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time_util::{format_date, parse_filing_date};

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_(\d{4}-\d{2}-\d{2})_(.+)\.txt$").expect("file name pattern"));

/// 文档标识：(cik, filing_date)，收益率标签按此键关联
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId {
    pub cik: u64,
    pub filing_date: NaiveDate,
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.cik, format_date(self.filing_date))
    }
}

/// 缓存键：(cik, filing_date, form)，决定本地文件名
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilingKey {
    pub cik: u64,
    pub filing_date: NaiveDate,
    /// 文件名安全的表单类型（`10-Q/A` 存为 `10-Q_A`）
    pub form: String,
}

impl FilingKey {
    pub fn new(cik: u64, filing_date: NaiveDate, form: &str) -> Self {
        Self {
            cik,
            filing_date,
            form: sanitize_form(form),
        }
    }

    pub fn id(&self) -> DocumentId {
        DocumentId {
            cik: self.cik,
            filing_date: self.filing_date,
        }
    }

    /// `{cik}_{YYYY-MM-DD}_{form}.txt`
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.txt", self.cik, format_date(self.filing_date), self.form)
    }

    /// 从缓存文件名还原键，不符合命名规则返回 None
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let caps = FILE_NAME_PATTERN.captures(file_name)?;
        let cik = caps.get(1)?.as_str().parse::<u64>().ok()?;
        let filing_date = parse_filing_date(caps.get(2)?.as_str())?;
        Some(Self {
            cik,
            filing_date,
            form: caps.get(3)?.as_str().to_string(),
        })
    }
}

impl fmt::Display for FilingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.cik, format_date(self.filing_date), self.form)
    }
}

fn sanitize_form(form: &str) -> String {
    form.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// 抓取成功或命中缓存后得到的原始文档，创建后不再修改
#[derive(Debug, Clone)]
pub struct FilingDocument {
    pub key: FilingKey,
    pub raw_text: Vec<u8>,
    pub local_path: PathBuf,
}

impl FilingDocument {
    /// 按 UTF-8 解码，非法字节替换
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw_text).into_owned()
    }
}

/// MD&A 抽取结果。空文本是合法结果，表示未定位到 MD&A
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSection {
    pub key: FilingKey,
    pub section_text: String,
    pub section_count: usize,
}

impl ExtractedSection {
    pub fn is_empty(&self) -> bool {
        self.section_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_round_trip() {
        let key = FilingKey::new(320193, NaiveDate::from_ymd_opt(2020, 7, 31).unwrap(), "10-Q/A");
        assert_eq!(key.form, "10-Q_A");
        assert_eq!(key.file_name(), "320193_2020-07-31_10-Q_A.txt");
        assert_eq!(FilingKey::from_file_name(&key.file_name()), Some(key));
    }

    #[test]
    fn test_from_file_name_rejects_foreign_files() {
        assert!(FilingKey::from_file_name("notes.txt").is_none());
        assert!(FilingKey::from_file_name("320193_2020-07-31_10-Q.html").is_none());
        assert!(FilingKey::from_file_name("abc_2020-07-31_10-Q.txt").is_none());
    }
}
