//! 抓取调度
//!
//! 每条记录的状态机：`Pending → Downloading → {Cached | Succeeded | Failed}`。
//! 缓存命中不发请求；404 直接失败；暂时性错误按 `RetryPolicy` 退避重试；
//! 上一次请求结束到下一次请求开始之间由 `Throttle` 保证最小间隔。

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::filing::fetch::cache::DocumentCache;
use crate::filing::fetch::client::DocumentClient;
use crate::filing::fetch::retry::FetchPolicy;
use crate::filing::fetch::throttle::Throttle;
use crate::filing::model::IndexRecord;
use crate::filing::storage;

/// 终态失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    NotFound,
    /// 重试次数用尽
    RetriesExhausted { last_error: String },
    /// 内容写入本地失败
    Storage(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::NotFound => write!(f, "not found"),
            FetchFailure::RetriesExhausted { last_error } => write!(f, "retries exhausted: {}", last_error),
            FetchFailure::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Pending,
    Downloading,
    Cached,
    Succeeded,
    Failed(FetchFailure),
}

impl FetchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Cached | FetchState::Succeeded | FetchState::Failed(_))
    }
}

/// 单个目标的抓取结果
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub url: String,
    pub dest: PathBuf,
    pub state: FetchState,
    /// 实际发出的网络请求次数
    pub attempts: u32,
}

/// 批量抓取统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub cached: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 失败中属于 404 的部分
    pub not_found: usize,
    pub network_attempts: usize,
}

impl FetchReport {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        self.network_attempts += outcome.attempts as usize;
        match &outcome.state {
            FetchState::Cached => self.cached += 1,
            FetchState::Succeeded => self.succeeded += 1,
            FetchState::Failed(failure) => {
                self.failed += 1;
                if *failure == FetchFailure::NotFound {
                    self.not_found += 1;
                }
            }
            FetchState::Pending | FetchState::Downloading => {}
        }
    }

    pub fn total(&self) -> usize {
        self.cached + self.succeeded + self.failed
    }
}

/// `{archive_root}/{path}`
pub fn document_url(archive_root: &str, path: &str) -> String {
    format!(
        "{}/{}",
        archive_root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct FetchScheduler<C> {
    client: C,
    policy: FetchPolicy,
    throttle: Throttle,
}

impl<C: DocumentClient> FetchScheduler<C> {
    pub fn new(client: C, policy: FetchPolicy) -> Self {
        Self {
            client,
            throttle: Throttle::new(policy.min_interval),
            policy,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 抓取一个 URL 到本地路径，目标已存在时直接返回 `Cached`
    pub async fn fetch_to(&mut self, url: &str, dest: &Path) -> FetchOutcome {
        let mut outcome = FetchOutcome {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            state: FetchState::Pending,
            attempts: 0,
        };

        if dest.is_file() {
            debug!("命中缓存: {}", dest.display());
            outcome.state = FetchState::Cached;
            return outcome;
        }

        outcome.state = FetchState::Downloading;
        let retry = self.policy.retry;
        let mut attempt = 0u32;

        while !outcome.state.is_terminal() {
            attempt += 1;
            self.throttle.acquire().await;
            outcome.attempts = attempt;

            let response = self.client.get(url).await;
            self.throttle.release();
            match response {
                Ok(body) => {
                    outcome.state = match storage::atomic_write(dest, &body) {
                        Ok(()) => {
                            debug!("下载完成: {} -> {} ({} bytes)", url, dest.display(), body.len());
                            FetchState::Succeeded
                        }
                        Err(e) => {
                            warn!("写入失败: {}, err={}", dest.display(), e);
                            FetchState::Failed(FetchFailure::Storage(e.to_string()))
                        }
                    };
                }
                Err(FetchError::NotFound(_)) => {
                    warn!("资源不存在，不再重试: {}", url);
                    outcome.state = FetchState::Failed(FetchFailure::NotFound);
                }
                Err(FetchError::Transient(e)) => {
                    if retry.has_attempts_left(attempt) {
                        let wait = retry.backoff_after(attempt);
                        warn!(
                            "请求失败: {}，第 {}/{} 次，{}ms 后重试: {}",
                            url,
                            attempt,
                            retry.max_attempts,
                            wait.as_millis(),
                            e
                        );
                        if !wait.is_zero() {
                            sleep(wait).await;
                        }
                    } else {
                        warn!("重试次数用尽: {} ({} 次): {}", url, attempt, e);
                        outcome.state = FetchState::Failed(FetchFailure::RetriesExhausted { last_error: e });
                    }
                }
            }
        }

        outcome
    }

    /// 抓取一批申报文档到缓存目录，单条失败只计数不中断
    pub async fn fetch_records(
        &mut self,
        records: &[&IndexRecord],
        archive_root: &str,
        cache: &DocumentCache,
    ) -> (Vec<FetchOutcome>, FetchReport) {
        info!("📡 开始抓取申报文档: {} 条, 缓存目录 {}", records.len(), cache.dir().display());

        let mut report = FetchReport::default();
        let mut outcomes = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let url = document_url(archive_root, &record.path);
            let dest = cache.path_for(&record.key());
            let outcome = self.fetch_to(&url, &dest).await;
            report.record(&outcome);

            if let FetchState::Failed(failure) = &outcome.state {
                warn!("抓取失败: cik={}, date={}, {}", record.cik, record.filing_date, failure);
            }
            if (i + 1) % 100 == 0 {
                info!("抓取进度 {}/{}: {:?}", i + 1, records.len(), report);
            }
            outcomes.push(outcome);
        }

        info!(
            "✅ 抓取完成: 缓存 {}, 成功 {}, 失败 {} (404: {}), 请求 {} 次",
            report.cached, report.succeeded, report.failed, report.not_found, report.network_attempts
        );
        (outcomes, report)
    }
}
