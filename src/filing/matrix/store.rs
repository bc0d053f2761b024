//! 矩阵持久化：每个矩阵一个 .npy，另附行清单与列清单

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::filing::matrix::builder::{MatrixOutputs, MatrixRow};
use crate::filing::matrix::vocabulary::Vocabulary;
use crate::filing::storage;

pub const TERM_FREQUENCY_FILE: &str = "tf.npy";
pub const PRESENCE_FILE: &str = "presence.npy";
pub const DOCUMENT_FREQUENCY_FILE: &str = "doc_freq.npy";
pub const IDF_FILE: &str = "idf.npy";
pub const TFIDF_FILE: &str = "tfidf.npy";
pub const TERM_WEIGHT_FILE: &str = "term_weight.npy";
pub const DOCUMENT_LENGTH_FILE: &str = "doc_length.npy";
pub const ROWS_FILE: &str = "rows.csv";
pub const COLUMNS_FILE: &str = "columns.csv";

/// 列清单中的一列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixColumn {
    pub column: usize,
    pub word: String,
    pub negative: bool,
    pub positive: bool,
}

#[derive(Debug, Clone)]
pub struct MatrixStore {
    dir: PathBuf,
}

impl MatrixStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn save(&self, outputs: &MatrixOutputs, vocabulary: &Vocabulary) -> AppResult<()> {
        storage::write_npy(&self.path(TERM_FREQUENCY_FILE), &outputs.term_frequency)?;
        storage::write_npy(&self.path(PRESENCE_FILE), &outputs.presence)?;
        storage::write_npy(&self.path(DOCUMENT_FREQUENCY_FILE), &outputs.document_frequency)?;
        storage::write_npy(&self.path(IDF_FILE), &outputs.idf)?;
        storage::write_npy(&self.path(TFIDF_FILE), &outputs.tfidf)?;
        storage::write_npy(&self.path(TERM_WEIGHT_FILE), &outputs.term_weight)?;
        storage::write_npy(&self.path(DOCUMENT_LENGTH_FILE), &outputs.document_length)?;
        storage::write_csv(&self.path(ROWS_FILE), &outputs.rows)?;

        let columns = vocabulary.entries().iter().enumerate().map(|(column, entry)| MatrixColumn {
            column,
            word: entry.word.clone(),
            negative: entry.polarity.negative,
            positive: entry.polarity.positive,
        });
        storage::write_csv(&self.path(COLUMNS_FILE), columns)?;

        info!("💾 矩阵已写出: {}", self.dir.display());
        Ok(())
    }

    /// 行清单，缺失说明矩阵阶段尚未运行
    pub fn load_rows(&self) -> AppResult<Vec<MatrixRow>> {
        storage::read_csv(&self.path(ROWS_FILE))
    }

    pub fn load_columns(&self) -> AppResult<Vec<MatrixColumn>> {
        storage::read_csv(&self.path(COLUMNS_FILE))
    }

    pub fn load_tfidf(&self) -> AppResult<Array2<f64>> {
        self.load_matrix(TFIDF_FILE)
    }

    pub fn load_matrix(&self, file_name: &str) -> AppResult<Array2<f64>> {
        let path = self.path(file_name);
        if !path.is_file() {
            return Err(AppError::Config(format!("缺少矩阵文件: {}", path.display())));
        }
        storage::read_npy(&path)
    }

    pub fn load_vector(&self, file_name: &str) -> AppResult<Array1<f64>> {
        let path = self.path(file_name);
        if !path.is_file() {
            return Err(AppError::Config(format!("缺少向量文件: {}", path.display())));
        }
        storage::read_npy(&path)
    }
}
