//! CIK → 交易代码映射
//!
//! 输入为制表符或逗号分隔的两列文本（SEC ticker.txt 为 `ticker\tcik`，无表头），
//! 单元格可以带引号，列顺序按哪一列能解析为整数自动判断。同一 CIK 出现多次时保留第一个代码。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 代码统一为大写并去掉 `-` 和 `.`（`BRK-B`、`brk.b` → `BRKB`）
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '.')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickerMapReport {
    pub lines: usize,
    pub mapped: usize,
    pub malformed: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TickerMap {
    by_cik: HashMap<u64, String>,
}

impl TickerMap {
    /// 映射表缺失属于致命配置错误
    pub fn load(path: &Path) -> AppResult<(Self, TickerMapReport)> {
        if !path.is_file() {
            return Err(AppError::Config(format!("CIK 映射表不存在: {}", path.display())));
        }
        let bytes = fs::read(path)?;
        let (map, report) = Self::parse(&String::from_utf8_lossy(&bytes));
        info!(
            "🔗 CIK 映射加载完成: {} 个 CIK (重复 {}, 坏行 {}), 来源 {}",
            report.mapped,
            report.duplicates,
            report.malformed,
            path.display()
        );
        Ok((map, report))
    }

    pub fn parse(content: &str) -> (Self, TickerMapReport) {
        let mut map = Self::default();
        let mut report = TickerMapReport::default();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(detect_delimiter(content))
            .from_reader(content.as_bytes());

        for row in reader.records() {
            let pair = match row {
                Ok(row) if row.iter().all(str::is_empty) => continue,
                Ok(row) => {
                    report.lines += 1;
                    parse_pair(&row)
                }
                Err(e) => {
                    report.lines += 1;
                    debug!("映射行无法解析: {}", e);
                    None
                }
            };
            match pair {
                Some((cik, ticker)) => {
                    if map.by_cik.contains_key(&cik) {
                        report.duplicates += 1;
                    } else {
                        map.by_cik.insert(cik, ticker);
                    }
                }
                None => report.malformed += 1,
            }
        }
        report.mapped = map.len();
        (map, report)
    }

    pub fn resolve(&self, cik: u64) -> Option<&str> {
        self.by_cik.get(&cik).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_cik.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cik.is_empty()
    }
}

/// 首个非空行含制表符时按 TSV 读取（SEC ticker.txt），否则按 CSV
fn detect_delimiter(content: &str) -> u8 {
    match content.lines().find(|l| !l.trim().is_empty()) {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

fn parse_pair(row: &StringRecord) -> Option<(u64, String)> {
    let (first, second) = (row.get(0)?, row.get(1)?);
    let (cik, ticker) = match (first.parse::<u64>(), second.parse::<u64>()) {
        (Err(_), Ok(cik)) => (cik, first),
        (Ok(cik), Err(_)) => (cik, second),
        _ => {
            debug!("跳过映射行: {:?}", row);
            return None;
        }
    };
    let ticker = normalize_ticker(ticker);
    if ticker.is_empty() {
        return None;
    }
    Some((cik, ticker))
}
