//! 索引文件下载
//!
//! 复用抓取调度器：已落地的周期文件直接跳过，请求间隔与重试策略和文档抓取一致。

use std::path::Path;

use tracing::{info, warn};

use crate::filing::fetch::{DocumentClient, FetchOutcome, FetchReport, FetchScheduler, FetchState};
use crate::filing::index::period::Period;

/// 下载各周期的 master.idx 到 `{index_dir}/{year}/QTR{q}/master.idx`
pub async fn download_index_files<C: DocumentClient>(
    scheduler: &mut FetchScheduler<C>,
    full_index_root: &str,
    index_dir: &Path,
    periods: &[Period],
) -> FetchReport {
    info!("📥 下载索引文件: {} 个周期", periods.len());
    let mut report = FetchReport::default();

    for period in periods {
        let url = period.index_url(full_index_root);
        let dest = period.local_path(index_dir);
        let outcome = scheduler.fetch_to(&url, &dest).await;
        match &outcome.state {
            FetchState::Cached => info!("{} 索引已存在，跳过", period),
            FetchState::Succeeded => info!("{} 索引下载完成", period),
            FetchState::Failed(failure) => warn!("{} 索引下载失败: {}", period, failure),
            _ => {}
        }
        report.record(&outcome);
    }

    info!(
        "索引下载完成: 已存在 {}, 新下载 {}, 失败 {}",
        report.cached, report.succeeded, report.failed
    );
    report
}

/// 下载单个参考文件（如 CIK-代码对照表），已存在则跳过
pub async fn download_reference_file<C: DocumentClient>(
    scheduler: &mut FetchScheduler<C>,
    url: &str,
    dest: &Path,
) -> FetchOutcome {
    let outcome = scheduler.fetch_to(url, dest).await;
    if let FetchState::Failed(failure) = &outcome.state {
        warn!("参考文件下载失败: {}, {}", url, failure);
    }
    outcome
}
