//! 申报过滤条件

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::filing::model::IndexRecord;

/// 按表单类型、CIK 集合和日期区间（闭区间）过滤
#[derive(Debug, Clone)]
pub struct FilingFilter {
    pub forms: Vec<String>,
    pub ciks: Option<HashSet<u64>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Default for FilingFilter {
    fn default() -> Self {
        Self {
            forms: vec!["10-Q".to_string()],
            ciks: None,
            start: None,
            end: None,
        }
    }
}

impl FilingFilter {
    pub fn matches(&self, record: &IndexRecord) -> bool {
        if !self.forms.is_empty() && !self.forms.iter().any(|f| f.eq_ignore_ascii_case(&record.form)) {
            return false;
        }
        if let Some(ciks) = &self.ciks {
            if !ciks.contains(&record.cik) {
                return false;
            }
        }
        if self.start.map_or(false, |start| record.filing_date < start) {
            return false;
        }
        if self.end.map_or(false, |end| record.filing_date > end) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [IndexRecord]) -> Vec<&'a IndexRecord> {
        let selected: Vec<&IndexRecord> = records.iter().filter(|r| self.matches(r)).collect();
        info!(
            "过滤申报: 表单={:?}, CIK数={}, 区间={:?}~{:?}, 命中 {}/{}",
            self.forms,
            self.ciks.as_ref().map_or(0, |c| c.len()),
            self.start,
            self.end,
            selected.len(),
            records.len()
        );
        selected
    }
}

/// 读取 CIK 白名单：每行一个 CIK，或带 `cik` 表头的 CSV（支持带引号的单元格）
///
/// 文件存在但没有任何有效 CIK 时视为配置错误，否则过滤会静默丢掉所有申报
pub fn load_cik_set(path: &Path) -> AppResult<HashSet<u64>> {
    let file = File::open(path)
        .map_err(|e| AppError::Config(format!("无法读取CIK文件 {}: {}", path.display(), e)))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut column: Option<usize> = None;
    let mut ciks = HashSet::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        match column {
            Some(pos) => insert_cik(&mut ciks, row.get(pos).unwrap_or("")),
            // 首行含 `cik` 列名时视为表头，否则按单列文本处理
            None => match row.iter().position(|h| h.eq_ignore_ascii_case("cik")) {
                Some(pos) => column = Some(pos),
                None => {
                    column = Some(0);
                    insert_cik(&mut ciks, row.get(0).unwrap_or(""));
                }
            },
        }
    }

    if ciks.is_empty() {
        return Err(AppError::Config(format!("CIK文件中没有有效CIK: {}", path.display())));
    }
    info!("加载CIK白名单 {} 个: {}", ciks.len(), path.display());
    Ok(ciks)
}

fn insert_cik(ciks: &mut HashSet<u64>, cell: &str) {
    match cell.parse::<u64>() {
        Ok(cik) => {
            ciks.insert(cik);
        }
        Err(_) => warn!("忽略无效CIK: {}", cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(cik: u64, form: &str, date: (i32, u32, u32)) -> IndexRecord {
        IndexRecord {
            cik,
            name: "X".to_string(),
            form: form.to_string(),
            filing_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            path: "edgar/data/x.txt".to_string(),
        }
    }

    #[test]
    fn test_filter_by_form_cik_and_range() {
        let filter = FilingFilter {
            forms: vec!["10-q".to_string()],
            ciks: Some([1u64, 2].into_iter().collect()),
            start: NaiveDate::from_ymd_opt(2019, 1, 1),
            end: NaiveDate::from_ymd_opt(2019, 12, 31),
        };
        assert!(filter.matches(&record(1, "10-Q", (2019, 5, 1))));
        assert!(filter.matches(&record(2, "10-Q", (2019, 12, 31))));
        assert!(!filter.matches(&record(3, "10-Q", (2019, 5, 1))));
        assert!(!filter.matches(&record(1, "10-K", (2019, 5, 1))));
        assert!(!filter.matches(&record(1, "10-Q", (2020, 1, 1))));
    }

    #[test]
    fn test_load_cik_set_formats() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("ciks.txt");
        fs::write(&plain, "320193\n789019\n\nbad\n").unwrap();
        let set = load_cik_set(&plain).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&320193));

        let csv = dir.path().join("ticker.csv");
        fs::write(&csv, "ticker,cik\naapl,320193\nmsft,789019\n").unwrap();
        let set = load_cik_set(&csv).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&789019));
    }

    #[test]
    fn test_load_cik_set_quoted_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.csv");
        fs::write(&path, "\"ticker\",\"cik\"\n\"AAPL\",\"320193\"\n\"BRK, B\",\"1067983\"\n").unwrap();
        let set = load_cik_set(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&320193));
        assert!(set.contains(&1067983));
    }

    #[test]
    fn test_load_cik_set_without_valid_rows_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "ticker,cik\naapl,n/a\n").unwrap();
        assert!(matches!(load_cik_set(&path), Err(AppError::Config(_))));
    }
}
