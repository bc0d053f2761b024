//! 选择条件：周期、表单、CIK 白名单、日期区间

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::filing::fetch::{load_cik_set, FilingFilter};
use crate::filing::index::Period;
use crate::time_util::year_bounds;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub start_year: i32,
    pub end_year: i32,
    pub quarters: Vec<u8>,
    /// 显式指定周期时忽略年份与季度
    pub periods: Vec<Period>,
    pub forms: Vec<String>,
    pub cik_file: Option<PathBuf>,
    /// 未指定时取 `start_year-01-01`
    pub start_date: Option<NaiveDate>,
    /// 未指定时取 `end_year-12-31`
    pub end_date: Option<NaiveDate>,
    /// 覆盖已有的抽取结果
    pub force: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            start_year: 2019,
            end_year: 2019,
            quarters: vec![1, 2, 3, 4],
            periods: Vec::new(),
            forms: vec!["10-Q".to_string()],
            cik_file: None,
            start_date: None,
            end_date: None,
            force: false,
        }
    }
}

impl PipelineOptions {
    pub fn periods(&self) -> AppResult<Vec<Period>> {
        if !self.periods.is_empty() {
            let mut periods = self.periods.clone();
            periods.sort();
            periods.dedup();
            return Ok(periods);
        }
        if self.start_year > self.end_year {
            return Err(AppError::Config(format!(
                "起始年份 {} 晚于结束年份 {}",
                self.start_year, self.end_year
            )));
        }
        let periods = Period::expand(self.start_year, self.end_year, &self.quarters);
        if periods.is_empty() {
            return Err(AppError::Config(format!("季度参数无效: {:?}", self.quarters)));
        }
        Ok(periods)
    }

    pub fn filter(&self) -> AppResult<FilingFilter> {
        let (first_year, last_year) = match (self.periods.iter().min(), self.periods.iter().max()) {
            (Some(first), Some(last)) => (first.year, last.year),
            _ => (self.start_year, self.end_year),
        };
        let (default_start, default_end) = year_bounds(first_year, last_year)
            .ok_or_else(|| AppError::Config(format!("年份无效: {}-{}", first_year, last_year)))?;
        let ciks = match &self.cik_file {
            Some(path) => Some(load_cik_set(path)?),
            None => None,
        };
        Ok(FilingFilter {
            forms: self.forms.clone(),
            ciks,
            start: Some(self.start_date.unwrap_or(default_start)),
            end: Some(self.end_date.unwrap_or(default_end)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_from_years_and_quarters() {
        let opts = PipelineOptions {
            start_year: 2019,
            end_year: 2020,
            quarters: vec![2, 1],
            ..Default::default()
        };
        let periods = opts.periods().unwrap();
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].to_string(), "2019Q1");
    }

    #[test]
    fn test_explicit_periods_win() {
        let opts = PipelineOptions {
            periods: vec!["2021Q3".parse().unwrap()],
            ..Default::default()
        };
        assert_eq!(opts.periods().unwrap(), vec![Period::new(2021, 3).unwrap()]);
    }

    #[test]
    fn test_invalid_selection_is_config_error() {
        let reversed = PipelineOptions {
            start_year: 2020,
            end_year: 2019,
            ..Default::default()
        };
        assert!(matches!(reversed.periods(), Err(AppError::Config(_))));

        let bad_quarters = PipelineOptions {
            quarters: vec![5],
            ..Default::default()
        };
        assert!(matches!(bad_quarters.periods(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_filter_defaults_to_year_bounds() {
        let opts = PipelineOptions::default();
        let filter = opts.filter().unwrap();
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2019, 12, 31));
        assert!(filter.ciks.is_none());

        let explicit = PipelineOptions {
            periods: vec![Period::new(2021, 3).unwrap()],
            ..Default::default()
        };
        assert_eq!(explicit.filter().unwrap().start, NaiveDate::from_ymd_opt(2021, 1, 1));
    }
}
