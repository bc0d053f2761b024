//! 索引记录
//!
//! master.idx 中每行一条：`cik|name|form|filing_date|path`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndexLineError;
use crate::filing::model::document::FilingKey;
use crate::time_util::parse_filing_date;

pub const INDEX_FIELD_COUNT: usize = 5;

/// 合并索引中的一条申报记录，主键为 (cik, filing_date, form)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub cik: u64,
    pub name: String,
    pub form: String,
    pub filing_date: NaiveDate,
    /// 相对 Archives 根目录的路径
    pub path: String,
}

impl IndexRecord {
    /// 解析一行索引，字段数不等于5、CIK或日期无法解析都视为坏行
    pub fn parse_line(line: &str) -> Result<Self, IndexLineError> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() != INDEX_FIELD_COUNT {
            return Err(IndexLineError::FieldCount(parts.len()));
        }

        let cik_raw = parts[0].trim();
        let cik = cik_raw
            .parse::<u64>()
            .map_err(|_| IndexLineError::InvalidCik(cik_raw.to_string()))?;

        let date_raw = parts[3].trim();
        let filing_date =
            parse_filing_date(date_raw).ok_or_else(|| IndexLineError::InvalidDate(date_raw.to_string()))?;

        Ok(Self {
            cik,
            name: parts[1].trim().to_string(),
            form: parts[2].trim().to_string(),
            filing_date,
            path: parts[4].trim().to_string(),
        })
    }

    pub fn key(&self) -> FilingKey {
        FilingKey::new(self.cik, self.filing_date, &self.form)
    }
}
