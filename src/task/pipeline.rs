//! 阶段任务
//!
//! 每个阶段只读取上一阶段落地的产物，可单独重跑；已完成的工作（已缓存文档、
//! 已有抽取结果）不会重复执行。只有必需产物缺失才返回错误。

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};

use crate::error::AppError;
use crate::filing::fetch::{DocumentCache, DocumentClient, FetchReport, FetchScheduler};
use crate::filing::index::{download_index_files, download_reference_file, load_index, ConsolidationReport, IndexConsolidator};
use crate::filing::matrix::{MatrixReport, MatrixStore, TermFrequencyMatrixBuilder, Vocabulary, VocabularyLoadReport};
use crate::filing::model::DocumentId;
use crate::filing::returns::{
    join_labels, AlignmentReport, JoinReport, ReturnAligner, ReturnSeriesProvider, TickerMap, TickerMapReport,
};
use crate::filing::section::{extract_directory, ExtractionReport, SectionExtractor, SectionMarkers};
use crate::filing::{storage, RunContext};
use crate::task::options::PipelineOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexDownloadReport {
    pub index: FetchReport,
    /// CIK-代码对照表
    pub reference: FetchReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatrixStageReport {
    pub vocabulary: VocabularyLoadReport,
    pub matrix: MatrixReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReturnsStageReport {
    pub tickers: TickerMapReport,
    pub alignment: AlignmentReport,
    pub join: JoinReport,
}

/// 整次运行的报告，写入 `run_report.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub download_index: Option<IndexDownloadReport>,
    pub consolidate: Option<ConsolidationReport>,
    pub fetch: Option<FetchReport>,
    pub extract: Option<ExtractionReport>,
    pub matrix: Option<MatrixStageReport>,
    pub returns: Option<ReturnsStageReport>,
}

impl RunReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            download_index: None,
            consolidate: None,
            fetch: None,
            extract: None,
            matrix: None,
            returns: None,
        }
    }
}

/// 下载各周期索引文件和 CIK-代码对照表（已存在则跳过）
pub async fn run_download_index<C: DocumentClient>(
    ctx: &RunContext,
    opts: &PipelineOptions,
    scheduler: &mut FetchScheduler<C>,
) -> anyhow::Result<IndexDownloadReport> {
    let periods = opts.periods()?;
    let index = download_index_files(scheduler, &ctx.config.full_index_root, &ctx.paths.index_dir, &periods)
        .instrument(info_span!("download_index"))
        .await;

    let mut reference = FetchReport::default();
    let outcome = download_reference_file(scheduler, &ctx.config.ticker_url, &ctx.config.ticker_map_path).await;
    reference.record(&outcome);

    Ok(IndexDownloadReport { index, reference })
}

/// 合并本地索引文件为规范索引表
pub fn run_consolidate(ctx: &RunContext, opts: &PipelineOptions) -> anyhow::Result<ConsolidationReport> {
    let _span = info_span!("consolidate").entered();
    let periods = opts.periods()?;
    let consolidator = IndexConsolidator::new(&ctx.paths.index_dir, ctx.config.index_header_lines);
    let report = consolidator
        .consolidate_to(&periods, &ctx.paths.master_index)
        .context("写出规范索引失败")?;
    Ok(report)
}

/// 按过滤条件抓取申报文档到本地缓存
pub async fn run_fetch<C: DocumentClient>(
    ctx: &RunContext,
    opts: &PipelineOptions,
    scheduler: &mut FetchScheduler<C>,
) -> anyhow::Result<FetchReport> {
    let records = load_index(&ctx.paths.master_index)?;
    let filter = opts.filter()?;
    let selected = filter.apply(&records);
    let cache = DocumentCache::new(&ctx.paths.downloads);

    let (_, report) = scheduler
        .fetch_records(&selected, &ctx.config.archive_root, &cache)
        .instrument(info_span!("fetch"))
        .await;
    Ok(report)
}

/// 对缓存中的文档抽取 MD&A
pub fn run_extract(ctx: &RunContext, force: bool) -> anyhow::Result<ExtractionReport> {
    let _span = info_span!("extract").entered();
    let extractor = SectionExtractor::new(
        SectionMarkers::default(),
        ctx.config.min_section_chars,
        ctx.config.tail_policy,
    );
    let report = extract_directory(&extractor, &ctx.paths.downloads, &ctx.paths.cleaned, force)?;
    Ok(report)
}

/// 构建并写出全部矩阵
pub fn run_matrix(ctx: &RunContext) -> anyhow::Result<MatrixStageReport> {
    let _span = info_span!("matrix").entered();
    let (vocabulary, vocabulary_report) = Vocabulary::load(&ctx.config.dictionary_path, ctx.config.vocabulary_scope)?;
    if vocabulary.is_empty() {
        return Err(AppError::Config(format!("词典为空: {}", ctx.config.dictionary_path.display())).into());
    }

    let builder = TermFrequencyMatrixBuilder::new(&vocabulary);
    let (outputs, matrix_report) = builder.build_from_dir(&ctx.paths.cleaned)?;
    MatrixStore::new(&ctx.paths.matrix_dir).save(&outputs, &vocabulary)?;

    Ok(MatrixStageReport {
        vocabulary: vocabulary_report,
        matrix: matrix_report,
    })
}

/// 计算收益标签并与矩阵行连接
pub async fn run_returns<P: ReturnSeriesProvider>(
    ctx: &RunContext,
    provider: P,
) -> anyhow::Result<ReturnsStageReport> {
    let (tickers, tickers_report) = TickerMap::load(&ctx.config.ticker_map_path)?;
    let store = MatrixStore::new(&ctx.paths.matrix_dir);
    let rows = store.load_rows().context("读取矩阵行清单失败，请先运行 matrix 阶段")?;
    let ids: Vec<DocumentId> = rows.iter().map(|r| r.id()).collect();

    let mut aligner = ReturnAligner::new(provider, tickers, ctx.config.return_window)
        .with_query_interval(ctx.config.return_query_interval);
    let (labels, alignment) = aligner.align(&ids).instrument(info_span!("returns")).await;
    storage::write_csv(&ctx.paths.labels, &labels)?;
    info!("收益标签已写出: {}", ctx.paths.labels.display());

    let tfidf = store.load_tfidf()?;
    let (joined, join) = join_labels(&rows, &tfidf, &labels)?;
    joined.save(&ctx.paths.matrix_dir, &ctx.paths.joined)?;
    info!("连接完成: {} 行, 有效标签 {}, 哨兵 {}", join.rows, join.labeled, join.sentinel);

    Ok(ReturnsStageReport {
        tickers: tickers_report,
        alignment,
        join,
    })
}

/// 依次执行全部阶段并写出运行报告
pub async fn run_all<C: DocumentClient, P: ReturnSeriesProvider>(
    ctx: &RunContext,
    opts: &PipelineOptions,
    scheduler: &mut FetchScheduler<C>,
    provider: P,
) -> anyhow::Result<RunReport> {
    info!("🚀 开始完整运行: 数据目录 {}", ctx.config.data_dir.display());
    let mut report = RunReport::start();

    report.download_index = Some(run_download_index(ctx, opts, scheduler).await?);
    report.consolidate = Some(run_consolidate(ctx, opts)?);
    report.fetch = Some(run_fetch(ctx, opts, scheduler).await?);
    report.extract = Some(run_extract(ctx, opts.force)?);
    report.matrix = Some(run_matrix(ctx)?);
    report.returns = Some(run_returns(ctx, provider).await?);
    report.finished_at = Some(Utc::now());

    storage::write_json(&ctx.paths.report, &report)?;
    info!("🎉 运行完成，报告已写出: {}", ctx.paths.report.display());
    Ok(report)
}
