//! 标签与矩阵行连接
//!
//! 按行清单顺序逐行查找 (cik, filing_date) 的标签，找不到或为哨兵时记 0，
//! 行数始终与特征矩阵一致。

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use ndarray::{s, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::filing::matrix::MatrixRow;
use crate::filing::model::{DocumentId, ReturnRecord};
use crate::filing::storage;

pub const TFIDF_RETURNS_FILE: &str = "tfidf_returns.npy";
pub const FEATURES_LABELS_FILE: &str = "features_labels.npy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub row: usize,
    pub cik: u64,
    pub filing_date: NaiveDate,
    pub form: String,
    pub doc_length: u64,
    /// 该行 TF-IDF 在词表上的均值
    pub mean_tfidf: f64,
    pub label: f64,
    /// false 表示标签为哨兵值
    pub labeled: bool,
}

#[derive(Debug, Clone)]
pub struct JoinedOutputs {
    pub rows: Vec<JoinedRow>,
    /// n × 2：(mean_tfidf, label)
    pub tfidf_returns: Array2<f64>,
    /// n × (V + 1)：TF-IDF 矩阵末尾追加标签列
    pub features_labels: Array2<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub rows: usize,
    pub labeled: usize,
    pub sentinel: usize,
}

pub fn join_labels(
    rows: &[MatrixRow],
    tfidf: &Array2<f64>,
    labels: &[ReturnRecord],
) -> AppResult<(JoinedOutputs, JoinReport)> {
    if rows.len() != tfidf.nrows() {
        return Err(AppError::Storage(format!(
            "行清单与 TF-IDF 矩阵行数不一致: {} vs {}",
            rows.len(),
            tfidf.nrows()
        )));
    }

    let by_id: HashMap<DocumentId, &ReturnRecord> = labels
        .iter()
        .map(|r| {
            (
                DocumentId {
                    cik: r.cik,
                    filing_date: r.filing_date,
                },
                r,
            )
        })
        .collect();

    let n_terms = tfidf.ncols();
    let mut report = JoinReport {
        rows: rows.len(),
        ..Default::default()
    };
    let mut joined = Vec::with_capacity(rows.len());
    let mut tfidf_returns = Array2::<f64>::zeros((rows.len(), 2));
    let mut features_labels = Array2::<f64>::zeros((rows.len(), n_terms + 1));
    features_labels.slice_mut(s![.., ..n_terms]).assign(tfidf);

    for (i, (row, features)) in rows.iter().zip(tfidf.axis_iter(Axis(0))).enumerate() {
        let value = by_id.get(&row.id()).and_then(|r| r.cumulative_excess_return);
        if value.is_some() {
            report.labeled += 1;
        } else {
            report.sentinel += 1;
        }
        let label = value.unwrap_or(0.0);
        let mean_tfidf = features.mean().unwrap_or(0.0);

        tfidf_returns[[i, 0]] = mean_tfidf;
        tfidf_returns[[i, 1]] = label;
        features_labels[[i, n_terms]] = label;

        joined.push(JoinedRow {
            row: row.row,
            cik: row.cik,
            filing_date: row.filing_date,
            form: row.form.clone(),
            doc_length: row.doc_length,
            mean_tfidf,
            label,
            labeled: value.is_some(),
        });
    }

    Ok((
        JoinedOutputs {
            rows: joined,
            tfidf_returns,
            features_labels,
        },
        report,
    ))
}

impl JoinedOutputs {
    pub fn save(&self, matrix_dir: &Path, table_path: &Path) -> AppResult<()> {
        storage::write_npy(&matrix_dir.join(TFIDF_RETURNS_FILE), &self.tfidf_returns)?;
        storage::write_npy(&matrix_dir.join(FEATURES_LABELS_FILE), &self.features_labels)?;
        storage::write_csv(table_path, &self.rows)?;
        info!("💾 特征+标签已写出: {}", table_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn row(i: usize, cik: u64) -> MatrixRow {
        MatrixRow {
            row: i,
            cik,
            filing_date: NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            form: "10-Q".into(),
            file_name: format!("{}_2019-05-01_10-Q.txt", cik),
            doc_length: 10,
        }
    }

    #[test]
    fn test_join_keeps_row_count_and_defaults_to_zero() {
        let rows = vec![row(0, 1), row(1, 2), row(2, 3)];
        let tfidf = array![[1.0, 3.0], [0.0, 0.0], [2.0, 2.0]];
        let labels = vec![
            ReturnRecord {
                cik: 1,
                filing_date: rows[0].filing_date,
                ticker: Some("A".into()),
                cumulative_excess_return: Some(0.01),
                trading_days: 1,
            },
            ReturnRecord {
                cik: 3,
                filing_date: rows[2].filing_date,
                ticker: Some("C".into()),
                cumulative_excess_return: None,
                trading_days: 0,
            },
        ];

        let (out, report) = join_labels(&rows, &tfidf, &labels).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.labeled, 1);
        assert_eq!(report.sentinel, 2);
        assert_eq!(out.tfidf_returns, array![[2.0, 0.01], [0.0, 0.0], [2.0, 0.0]]);
        assert_eq!(out.features_labels.dim(), (3, 3));
        assert_eq!(out.features_labels.column(2).to_vec(), vec![0.01, 0.0, 0.0]);
        assert!(!out.rows[1].labeled);
    }

    #[test]
    fn test_row_count_mismatch_is_error() {
        let rows = vec![row(0, 1)];
        let tfidf = Array2::<f64>::zeros((2, 1));
        assert!(join_labels(&rows, &tfidf, &[]).is_err());
    }
}
