//! 收益率标签

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 外部收益率序列中的一天
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub instrument_return: f64,
    pub benchmark_return: f64,
}

impl DailyReturn {
    pub fn excess(&self) -> f64 {
        self.instrument_return - self.benchmark_return
    }
}

/// 一个申报的累计超额收益标签
///
/// `cumulative_excess_return` 为 None 表示哨兵值：代码无法映射或窗口内无数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub cik: u64,
    pub filing_date: NaiveDate,
    pub ticker: Option<String>,
    pub cumulative_excess_return: Option<f64>,
    pub trading_days: usize,
}

impl ReturnRecord {
    /// 连接到矩阵行时使用的数值，哨兵记为 0
    pub fn label_or_zero(&self) -> f64 {
        self.cumulative_excess_return.unwrap_or(0.0)
    }
}
