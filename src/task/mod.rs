//! 管道各阶段的任务入口

pub mod options;
pub mod pipeline;

pub use options::PipelineOptions;
pub use pipeline::{
    run_all, run_consolidate, run_download_index, run_extract, run_fetch, run_matrix, run_returns,
    IndexDownloadReport, MatrixStageReport, ReturnsStageReport, RunReport,
};
