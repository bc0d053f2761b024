//! 索引下载与合并

pub mod consolidator;
pub mod downloader;
pub mod period;

pub use consolidator::{load_index, ConsolidationReport, IndexConsolidator};
pub use downloader::{download_index_files, download_reference_file};
pub use period::Period;
