//! 运行配置
//!
//! 所有参数来自环境变量（`.env` 由 dotenv 预先加载），CLI 只覆盖过滤条件。

use std::path::PathBuf;
use std::time::Duration;

use crate::app_config::env::{env_i64, env_is_true, env_opt, env_or_default, env_u64};
use crate::error::{AppError, AppResult};
use crate::filing::fetch::{FetchPolicy, RetryPolicy};
use crate::filing::matrix::VocabularyScope;
use crate::filing::returns::ReturnWindow;
use crate::filing::section::TailPolicy;

pub const DEFAULT_ARCHIVE_ROOT: &str = "https://www.sec.gov/Archives";
pub const DEFAULT_FULL_INDEX_ROOT: &str = "https://www.sec.gov/Archives/edgar/full-index";
pub const DEFAULT_TICKER_URL: &str = "https://www.sec.gov/include/ticker.txt";
pub const DEFAULT_USER_AGENT: &str = "edgar_quant research contact@example.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 产物根目录
    pub data_dir: PathBuf,
    /// SEC 要求请求方声明 User-Agent
    pub user_agent: String,
    pub archive_root: String,
    pub full_index_root: String,
    pub ticker_url: String,
    /// 抓取策略：请求间隔 + 重试退避
    pub fetch: FetchPolicy,
    pub request_timeout: Duration,
    /// master.idx 文件头行数
    pub index_header_lines: usize,
    pub min_section_chars: usize,
    pub tail_policy: TailPolicy,
    pub dictionary_path: PathBuf,
    pub vocabulary_scope: VocabularyScope,
    pub ticker_map_path: PathBuf,
    pub return_series_path: PathBuf,
    pub return_window: ReturnWindow,
    /// 收益率查询之间的最小间隔，本地数据源为 0
    pub return_query_interval: Duration,
}

impl AppConfig {
    /// 从环境变量读取配置
    pub fn from_env() -> AppResult<Self> {
        let data_dir = PathBuf::from(env_or_default("EDGAR_DATA_DIR", "./data"));

        let tail_policy = env_or_default("MDA_TAIL_POLICY", "discard")
            .parse::<TailPolicy>()
            .map_err(AppError::Config)?;
        let vocabulary_scope = env_or_default("VOCABULARY_SCOPE", "all")
            .parse::<VocabularyScope>()
            .map_err(AppError::Config)?;

        let max_attempts = env_u64("EDGAR_MAX_ATTEMPTS", 4) as u32;
        if max_attempts == 0 {
            return Err(AppError::Config("EDGAR_MAX_ATTEMPTS 必须大于0".to_string()));
        }

        let fetch = FetchPolicy {
            min_interval: Duration::from_millis(env_u64("EDGAR_MIN_INTERVAL_MS", 1000)),
            retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(env_u64("EDGAR_INITIAL_BACKOFF_MS", 10_000)),
                multiplier: env_u64("EDGAR_BACKOFF_MULTIPLIER", 2).max(1) as u32,
            },
        };

        let path_or = |key: &str, file_name: &str| {
            env_opt(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(file_name))
        };

        Ok(Self {
            user_agent: env_or_default("EDGAR_USER_AGENT", DEFAULT_USER_AGENT),
            archive_root: env_or_default("EDGAR_ARCHIVE_ROOT", DEFAULT_ARCHIVE_ROOT),
            full_index_root: env_or_default("EDGAR_FULL_INDEX_ROOT", DEFAULT_FULL_INDEX_ROOT),
            ticker_url: env_or_default("EDGAR_TICKER_URL", DEFAULT_TICKER_URL),
            fetch,
            request_timeout: Duration::from_secs(env_u64("EDGAR_REQUEST_TIMEOUT_SECS", 60)),
            index_header_lines: env_u64("INDEX_HEADER_LINES", 11) as usize,
            min_section_chars: env_u64("MDA_MIN_SECTION_CHARS", 100) as usize,
            tail_policy,
            dictionary_path: path_or("DICTIONARY_PATH", "LoughranMcDonald_MasterDictionary.csv"),
            vocabulary_scope,
            ticker_map_path: path_or("TICKER_MAP_PATH", "cik_lookup.txt"),
            return_series_path: path_or("RETURN_SERIES_PATH", "daily_returns.csv"),
            return_window: ReturnWindow {
                days: env_i64("RETURN_WINDOW_DAYS", 4),
                end_inclusive: env_is_true("RETURN_WINDOW_END_INCLUSIVE", true),
            },
            return_query_interval: Duration::from_millis(env_u64("RETURN_QUERY_INTERVAL_MS", 0)),
            data_dir,
        })
    }

    /// 以指定目录为根的默认配置，测试与脚本使用
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            archive_root: DEFAULT_ARCHIVE_ROOT.to_string(),
            full_index_root: DEFAULT_FULL_INDEX_ROOT.to_string(),
            ticker_url: DEFAULT_TICKER_URL.to_string(),
            fetch: FetchPolicy::default(),
            request_timeout: Duration::from_secs(60),
            index_header_lines: 11,
            min_section_chars: 100,
            tail_policy: TailPolicy::default(),
            dictionary_path: data_dir.join("LoughranMcDonald_MasterDictionary.csv"),
            vocabulary_scope: VocabularyScope::default(),
            ticker_map_path: data_dir.join("cik_lookup.txt"),
            return_series_path: data_dir.join("daily_returns.csv"),
            return_window: ReturnWindow::default(),
            return_query_interval: Duration::ZERO,
            data_dir,
        }
    }
}
