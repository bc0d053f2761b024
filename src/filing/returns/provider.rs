//! 外部收益率序列查询接口

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::filing::model::DailyReturn;
use crate::filing::returns::ticker_map::normalize_ticker;

/// 收益率数据源
///
/// 返回 `[start, end]`（闭区间）内按日期升序的日收益；没有数据是合法结果，返回空列表
#[async_trait]
pub trait ReturnSeriesProvider: Send + Sync {
    async fn daily_returns(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyReturn>>;
}

#[derive(Debug, Deserialize)]
struct SeriesRow {
    ticker: String,
    date: NaiveDate,
    ret: f64,
    benchmark: f64,
}

/// 本地 CSV 收益率表：`ticker,date,ret,benchmark`
#[derive(Debug, Clone, Default)]
pub struct CsvReturnSeries {
    series: HashMap<String, Vec<DailyReturn>>,
}

impl CsvReturnSeries {
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::Config(format!("收益率数据不存在: {}", path.display())));
        }
        let series = Self::from_reader(File::open(path)?)?;
        info!("📈 收益率数据加载完成: {} 个代码, 来源 {}", series.series.len(), path.display());
        Ok(series)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut series: HashMap<String, Vec<DailyReturn>> = HashMap::new();
        let mut malformed = 0usize;

        for row in reader.deserialize::<SeriesRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    debug!("跳过收益率坏行: {}", e);
                    malformed += 1;
                    continue;
                }
            };
            series.entry(normalize_ticker(&row.ticker)).or_default().push(DailyReturn {
                date: row.date,
                instrument_return: row.ret,
                benchmark_return: row.benchmark,
            });
        }

        for days in series.values_mut() {
            days.sort_by_key(|d| d.date);
        }
        if malformed > 0 {
            info!("收益率数据坏行 {} 条已跳过", malformed);
        }
        Ok(Self { series })
    }
}

#[async_trait]
impl ReturnSeriesProvider for CsvReturnSeries {
    async fn daily_returns(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyReturn>> {
        Ok(self
            .series
            .get(ticker)
            .map(|days| {
                days.iter()
                    .filter(|d| d.date >= start && d.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_csv_series_window_query() {
        let csv = "ticker,date,ret,benchmark\n\
                   AAPL,2019-05-03,0.01,0.0\n\
                   AAPL,2019-05-01,0.02,0.01\n\
                   brk-b,2019-05-01,0.5,0.1\n\
                   AAPL,not-a-date,1,1\n";
        let series = CsvReturnSeries::from_reader(csv.as_bytes()).unwrap();

        let days = series.daily_returns("AAPL", date(1), date(2)).await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(1));

        let all = series.daily_returns("AAPL", date(1), date(5)).await.unwrap();
        assert_eq!(all.iter().map(|d| d.date).collect::<Vec<_>>(), vec![date(1), date(3)]);

        assert_eq!(series.daily_returns("BRKB", date(1), date(1)).await.unwrap().len(), 1);
        assert!(series.daily_returns("MSFT", date(1), date(5)).await.unwrap().is_empty());
    }
}
