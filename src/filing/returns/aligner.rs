//! 收益率对齐
//!
//! 对每个 (cik, filing_date)：映射到交易代码，查询申报日起的前向窗口，
//! 累加每个交易日的 (个股收益 − 基准收益)。代码无法映射、窗口内无数据或
//! 数据源报错时记为哨兵标签，不中断整批。

use std::collections::HashSet;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::filing::fetch::Throttle;
use crate::filing::model::{DailyReturn, DocumentId, ReturnRecord};
use crate::filing::returns::provider::ReturnSeriesProvider;
use crate::filing::returns::ticker_map::TickerMap;

/// 申报后的收益窗口 `[filing_date, filing_date + days]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnWindow {
    pub days: i64,
    /// false 时不含 `filing_date + days` 当天
    pub end_inclusive: bool,
}

impl Default for ReturnWindow {
    fn default() -> Self {
        Self {
            days: 4,
            end_inclusive: true,
        }
    }
}

impl ReturnWindow {
    /// 闭区间查询边界，窗口为空时返回 None
    pub fn bounds(&self, filing_date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let span = if self.end_inclusive { self.days } else { self.days.saturating_sub(1) };
        if span < 0 {
            return None;
        }
        let end = filing_date.checked_add_signed(TimeDelta::try_days(span)?)?;
        Some((filing_date, end))
    }
}

/// 窗口内逐日超额收益之和，无数据返回 None
pub fn cumulative_excess_return(days: &[DailyReturn]) -> Option<f64> {
    if days.is_empty() {
        None
    } else {
        Some(days.iter().map(DailyReturn::excess).sum())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentReport {
    pub documents: usize,
    pub labeled: usize,
    /// CIK 无法映射到代码
    pub unresolved: usize,
    /// 窗口内无数据
    pub no_data: usize,
    pub provider_errors: usize,
}

pub struct ReturnAligner<P> {
    provider: P,
    tickers: TickerMap,
    window: ReturnWindow,
    throttle: Throttle,
}

impl<P: ReturnSeriesProvider> ReturnAligner<P> {
    pub fn new(provider: P, tickers: TickerMap, window: ReturnWindow) -> Self {
        Self {
            provider,
            tickers,
            window,
            throttle: Throttle::new(Duration::ZERO),
        }
    }

    /// 远程数据源需要限速时设置查询间隔
    pub fn with_query_interval(mut self, interval: Duration) -> Self {
        self.throttle = Throttle::new(interval);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// 计算单个申报的标签
    pub async fn label(&mut self, id: DocumentId, report: &mut AlignmentReport) -> ReturnRecord {
        let mut record = ReturnRecord {
            cik: id.cik,
            filing_date: id.filing_date,
            ticker: None,
            cumulative_excess_return: None,
            trading_days: 0,
        };

        let Some(ticker) = self.tickers.resolve(id.cik).map(str::to_string) else {
            debug!("CIK 无法映射到代码: {}", id);
            report.unresolved += 1;
            return record;
        };
        record.ticker = Some(ticker.clone());

        let Some((start, end)) = self.window.bounds(id.filing_date) else {
            report.no_data += 1;
            return record;
        };

        if !self.throttle.min_interval().is_zero() {
            self.throttle.acquire().await;
        }
        let response = self.provider.daily_returns(&ticker, start, end).await;
        if !self.throttle.min_interval().is_zero() {
            self.throttle.release();
        }
        let days = match response {
            Ok(days) => days,
            Err(e) => {
                warn!("收益率查询失败: {} ({}), err={}", id, ticker, e);
                report.provider_errors += 1;
                return record;
            }
        };

        match cumulative_excess_return(&days) {
            Some(value) => {
                record.cumulative_excess_return = Some(value);
                record.trading_days = days.len();
                report.labeled += 1;
            }
            None => {
                debug!("窗口内无收益数据: {} ({}) {}..={}", id, ticker, start, end);
                report.no_data += 1;
            }
        }
        record
    }

    /// 为语料中的每个文档计算标签，同一 (cik, filing_date) 只查询一次
    pub async fn align(&mut self, ids: &[DocumentId]) -> (Vec<ReturnRecord>, AlignmentReport) {
        let mut seen = HashSet::new();
        let unique: Vec<DocumentId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        info!(
            "💹 开始计算收益标签: {} 个申报, 窗口 {} 天 (含末日: {})",
            unique.len(),
            self.window.days,
            self.window.end_inclusive
        );

        let mut report = AlignmentReport {
            documents: unique.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(unique.len());
        for id in unique {
            let record = self.label(id, &mut report).await;
            records.push(record);
        }

        info!(
            "✅ 收益标签完成: 有效 {}, 无法映射 {}, 无数据 {}, 查询失败 {}",
            report.labeled, report.unresolved, report.no_data, report.provider_errors
        );
        (records, report)
    }
}
