//! 索引合并
//!
//! 读取每个周期本地已落地的 master.idx，跳过固定行数的文件头，逐行解析为
//! `IndexRecord`。坏行丢弃计数，缺失的周期文件告警跳过，都不中断合并。

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppResult, IndexLineError};
use crate::filing::index::period::Period;
use crate::filing::model::IndexRecord;
use crate::filing::storage;

/// 合并结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    pub periods_read: usize,
    /// 缺失的周期（ConsolidationGap）
    pub periods_missing: Vec<String>,
    pub lines_read: usize,
    pub records: usize,
    pub malformed: usize,
    pub duplicates: usize,
}

pub struct IndexConsolidator {
    index_dir: PathBuf,
    header_lines: usize,
}

impl IndexConsolidator {
    pub fn new(index_dir: impl Into<PathBuf>, header_lines: usize) -> Self {
        Self {
            index_dir: index_dir.into(),
            header_lines,
        }
    }

    /// 合并所有周期，按出现顺序去重（主键 cik + filing_date + form）
    pub fn consolidate(&self, periods: &[Period]) -> (Vec<IndexRecord>, ConsolidationReport) {
        let mut report = ConsolidationReport::default();
        let mut seen: HashSet<(u64, NaiveDate, String)> = HashSet::new();
        let mut records = Vec::new();

        for period in periods {
            let path = period.local_path(&self.index_dir);
            let content = match read_index_text(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("索引文件缺失，跳过: period={}, path={}", period, path.display());
                    report.periods_missing.push(period.to_string());
                    continue;
                }
                Err(e) => {
                    warn!("索引文件读取失败，跳过: period={}, err={}", period, e);
                    report.periods_missing.push(period.to_string());
                    continue;
                }
            };

            report.periods_read += 1;
            let before = records.len();
            self.parse_content(&content, &mut seen, &mut records, &mut report);
            debug!("周期 {} 解析完成: 新增 {} 条", period, records.len() - before);
        }

        report.records = records.len();
        info!(
            "📚 索引合并完成: 周期 {} 个, 缺失 {} 个, 记录 {} 条, 坏行 {} 条, 重复 {} 条",
            report.periods_read,
            report.periods_missing.len(),
            report.records,
            report.malformed,
            report.duplicates
        );
        (records, report)
    }

    /// 解析单个索引文件的全文
    pub fn parse_content(
        &self,
        content: &str,
        seen: &mut HashSet<(u64, NaiveDate, String)>,
        records: &mut Vec<IndexRecord>,
        report: &mut ConsolidationReport,
    ) {
        for line in content.lines().skip(self.header_lines) {
            if line.trim().is_empty() {
                continue;
            }
            report.lines_read += 1;
            match IndexRecord::parse_line(line) {
                Ok(record) => {
                    let key = (record.cik, record.filing_date, record.form.clone());
                    if seen.insert(key) {
                        records.push(record);
                    } else {
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    report.malformed += 1;
                    log_malformed(line, &e);
                }
            }
        }
    }

    /// 合并并写出规范索引表
    pub fn consolidate_to(&self, periods: &[Period], output: &Path) -> AppResult<ConsolidationReport> {
        let (records, report) = self.consolidate(periods);
        storage::write_csv(output, &records)?;
        info!("规范索引已写出: {}", output.display());
        Ok(report)
    }
}

fn log_malformed(line: &str, err: &IndexLineError) {
    let preview: String = line.chars().take(80).collect();
    debug!("丢弃坏行: {} ({})", preview, err);
}

/// 读取索引文件，非 UTF-8 内容按 latin1 解码
fn read_index_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    })
}

/// 加载规范索引表，FetchScheduler 的唯一输入
pub fn load_index(path: &Path) -> AppResult<Vec<IndexRecord>> {
    storage::read_csv(path)
}
