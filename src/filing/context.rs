//! 运行上下文：配置 + 产物路径，在入口构造一次后按引用传给每个阶段

use std::path::{Path, PathBuf};

use crate::app_config::AppConfig;

/// 数据目录下各阶段产物的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index_dir: PathBuf,
    pub master_index: PathBuf,
    pub downloads: PathBuf,
    pub cleaned: PathBuf,
    pub matrix_dir: PathBuf,
    pub labels: PathBuf,
    pub joined: PathBuf,
    pub report: PathBuf,
}

impl ArtifactPaths {
    pub fn under(data_dir: &Path) -> Self {
        Self {
            index_dir: data_dir.join("index_files"),
            master_index: data_dir.join("master_index.csv"),
            downloads: data_dir.join("downloads"),
            cleaned: data_dir.join("cleaned"),
            matrix_dir: data_dir.join("matrix"),
            labels: data_dir.join("cumulative_excess_returns.csv"),
            joined: data_dir.join("features_labels.csv"),
            report: data_dir.join("run_report.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: AppConfig,
    pub paths: ArtifactPaths,
}

impl RunContext {
    pub fn new(config: AppConfig) -> Self {
        let paths = ArtifactPaths::under(&config.data_dir);
        Self { config, paths }
    }
}
