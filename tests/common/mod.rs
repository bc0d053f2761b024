#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use edgar_quant::error::{AppError, AppResult, FetchError};
use edgar_quant::filing::fetch::DocumentClient;
use edgar_quant::filing::model::DailyReturn;
use edgar_quant::filing::returns::ReturnSeriesProvider;

/// 按 URL 预置响应序列的客户端，记录每次请求的时间
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<HashMap<String, VecDeque<Result<Vec<u8>, FetchError>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    latency: Duration,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次请求在返回前等待 `latency`，模拟慢响应
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn script(&self, url: &str, responses: Vec<Result<Vec<u8>, FetchError>>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .extend(responses);
    }

    pub fn ok(&self, url: &str, body: &str) {
        self.script(url, vec![Ok(body.as_bytes().to_vec())]);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(u, _)| u == url).count()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

pub fn transient(msg: &str) -> Result<Vec<u8>, FetchError> {
    Err(FetchError::Transient(msg.to_string()))
}

pub fn not_found(url: &str) -> Result<Vec<u8>, FetchError> {
    Err(FetchError::NotFound(url.to_string()))
}

#[async_trait]
impl DocumentClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(FetchError::NotFound(url.to_string())))
    }
}

/// 固定数据的收益率源，记录每次查询的 (ticker, start, end)
#[derive(Default)]
pub struct StubReturns {
    pub days: HashMap<String, Vec<DailyReturn>>,
    pub failing: Vec<String>,
    pub queries: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl StubReturns {
    pub fn with_day(mut self, ticker: &str, date: NaiveDate, ret: f64, benchmark: f64) -> Self {
        self.days.entry(ticker.to_string()).or_default().push(DailyReturn {
            date,
            instrument_return: ret,
            benchmark_return: benchmark,
        });
        self
    }

    pub fn failing_for(mut self, ticker: &str) -> Self {
        self.failing.push(ticker.to_string());
        self
    }
}

#[async_trait]
impl ReturnSeriesProvider for StubReturns {
    async fn daily_returns(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyReturn>> {
        self.queries.lock().unwrap().push((ticker.to_string(), start, end));
        if self.failing.iter().any(|t| t == ticker) {
            return Err(AppError::Parse(format!("stub failure for {}", ticker)));
        }
        Ok(self
            .days
            .get(ticker)
            .map(|days| days.iter().filter(|d| d.date >= start && d.date <= end).copied().collect())
            .unwrap_or_default())
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// master.idx 固定的 11 行文件头
pub const MASTER_IDX_HEADER: &str = "Description:           Master Index of EDGAR Dissemination Feed
Last Data Received:    June 30, 2019
Comments:              webmaster@sec.gov
Anonymous FTP:         ftp://ftp.sec.gov/edgar/
Cloud HTTP:            https://www.sec.gov/Archives/




CIK|Company Name|Form Type|Date Filed|Filename
--------------------------------------------------------------------------------
";
