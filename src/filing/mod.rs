//! EDGAR 申报文本管道：索引合并 → 文档抓取 → MD&A 抽取 → 词频矩阵 → 收益标签

pub mod context;
pub mod fetch;
pub mod index;
pub mod matrix;
pub mod model;
pub mod returns;
pub mod section;
pub mod storage;

pub use context::{ArtifactPaths, RunContext};
