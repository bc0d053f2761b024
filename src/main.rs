use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};

use edgar_quant::app_config::log::setup_logging;
use edgar_quant::app_config::AppConfig;
use edgar_quant::filing::fetch::{FetchScheduler, HttpDocumentClient};
use edgar_quant::filing::index::Period;
use edgar_quant::filing::returns::CsvReturnSeries;
use edgar_quant::filing::RunContext;
use edgar_quant::task::{self, PipelineOptions};
use edgar_quant::time_util::parse_filing_date;

#[derive(Parser)]
#[command(name = "edgar_quant")]
#[command(about = "EDGAR 10-Q MD&A 文本特征与收益标签管道")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// 起始年份
    #[arg(long, default_value_t = 2019)]
    start_year: i32,

    /// 结束年份（含）
    #[arg(long, default_value_t = 2019)]
    end_year: i32,

    /// 季度列表，如 `1,2,3,4`
    #[arg(long, value_delimiter = ',', default_value = "1,2,3,4")]
    quarters: Vec<u8>,

    /// 显式周期列表，如 `2019Q1,2019Q2`，指定后忽略年份与季度
    #[arg(long, value_delimiter = ',', value_parser = parse_period)]
    periods: Vec<Period>,

    /// 表单类型
    #[arg(long, value_delimiter = ',', default_value = "10-Q")]
    forms: Vec<String>,

    /// CIK 白名单文件
    #[arg(long)]
    cik_file: Option<PathBuf>,

    /// 申报日期下限（含），默认起始年份 1 月 1 日
    #[arg(long, value_parser = parse_date)]
    start_date: Option<NaiveDate>,

    /// 申报日期上限（含），默认结束年份 12 月 31 日
    #[arg(long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// 下载各周期 master.idx 与 CIK-代码对照表
    DownloadIndex {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// 合并本地索引文件为规范索引表
    Consolidate {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// 按过滤条件抓取申报文档
    Fetch {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// 抽取 MD&A 章节
    Extract {
        /// 覆盖已有抽取结果
        #[arg(long)]
        force: bool,
    },
    /// 构建词频 / TF-IDF 矩阵
    Matrix,
    /// 计算累计超额收益标签并与矩阵连接
    Returns,
    /// 依次执行全部阶段
    Run {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 覆盖已有抽取结果
        #[arg(long)]
        force: bool,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_filing_date(raw).ok_or_else(|| format!("日期格式无效: {}", raw))
}

fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>()
}

impl SelectionArgs {
    fn into_options(self, force: bool) -> PipelineOptions {
        PipelineOptions {
            start_year: self.start_year,
            end_year: self.end_year,
            quarters: self.quarters,
            periods: self.periods,
            forms: self.forms,
            cik_file: self.cik_file,
            start_date: self.start_date,
            end_date: self.end_date,
            force,
        }
    }
}

fn fetch_scheduler(config: &AppConfig) -> anyhow::Result<FetchScheduler<HttpDocumentClient>> {
    let client = HttpDocumentClient::new(&config.user_agent, config.request_timeout)?;
    Ok(FetchScheduler::new(client, config.fetch))
}

async fn execute(ctx: &RunContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::DownloadIndex { selection } => {
            let mut scheduler = fetch_scheduler(&ctx.config)?;
            let report = task::run_download_index(ctx, &selection.into_options(false), &mut scheduler).await?;
            info!("download-index: {:?}", report);
        }
        Commands::Consolidate { selection } => {
            let report = task::run_consolidate(ctx, &selection.into_options(false))?;
            info!("consolidate: {:?}", report);
        }
        Commands::Fetch { selection } => {
            let mut scheduler = fetch_scheduler(&ctx.config)?;
            let report = task::run_fetch(ctx, &selection.into_options(false), &mut scheduler).await?;
            info!("fetch: {:?}", report);
        }
        Commands::Extract { force } => {
            let report = task::run_extract(ctx, force)?;
            info!("extract: {:?}", report);
        }
        Commands::Matrix => {
            let report = task::run_matrix(ctx)?;
            info!("matrix: {:?}", report);
        }
        Commands::Returns => {
            let provider = CsvReturnSeries::load(&ctx.config.return_series_path)?;
            let report = task::run_returns(ctx, provider).await?;
            info!("returns: {:?}", report);
        }
        Commands::Run { selection, force } => {
            let mut scheduler = fetch_scheduler(&ctx.config)?;
            let provider = CsvReturnSeries::load(&ctx.config.return_series_path)?;
            task::run_all(ctx, &selection.into_options(force), &mut scheduler, provider).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    // 日志写入线程的 guard 需要持有到进程结束
    let _log_guards = setup_logging()?;

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("加载配置失败")?;
    let ctx = RunContext::new(config);
    info!("数据目录: {}", ctx.config.data_dir.display());

    if let Err(e) = execute(&ctx, cli.command).await {
        error!("运行失败: {:#}", e);
        return Err(e);
    }
    Ok(())
}
