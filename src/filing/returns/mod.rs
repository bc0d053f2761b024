//! 收益率标签：CIK → 代码映射、窗口收益查询、与矩阵行连接

pub mod aligner;
pub mod join;
pub mod provider;
pub mod ticker_map;

pub use aligner::{cumulative_excess_return, AlignmentReport, ReturnAligner, ReturnWindow};
pub use join::{join_labels, JoinReport, JoinedOutputs, JoinedRow};
pub use provider::{CsvReturnSeries, ReturnSeriesProvider};
pub use ticker_map::{normalize_ticker, TickerMap, TickerMapReport};
