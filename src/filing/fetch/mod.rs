//! 远程文档抓取
//!
//! 请求间隔（礼貌性约束）与重试退避是两个独立的策略，分别由 `Throttle` 和
//! `RetryPolicy` 表达，调度器只负责把它们组合进每条记录的状态机。

pub mod cache;
pub mod client;
pub mod filter;
pub mod retry;
pub mod scheduler;
pub mod throttle;

pub use cache::DocumentCache;
pub use client::{DocumentClient, HttpDocumentClient};
pub use filter::{load_cik_set, FilingFilter};
pub use retry::{FetchPolicy, RetryPolicy};
pub use scheduler::{document_url, FetchFailure, FetchOutcome, FetchReport, FetchScheduler, FetchState};
pub use throttle::Throttle;
