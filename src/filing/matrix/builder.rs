//! 词频矩阵构建
//!
//! 一次计数，多路输出：词频、出现矩阵、文档频率、IDF、TF-IDF、长度归一化权重。
//! 所有矩阵第 i 行对应同一文档，第 j 列对应同一单词。

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::filing::fetch::cache::list_keys;
use crate::filing::matrix::tokenizer::count_tokens;
use crate::filing::matrix::vocabulary::Vocabulary;
use crate::filing::model::{DocumentId, FilingKey};

/// 行清单中的一行，行号即矩阵行下标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub row: usize,
    pub cik: u64,
    pub filing_date: NaiveDate,
    pub form: String,
    pub file_name: String,
    pub doc_length: u64,
}

impl MatrixRow {
    pub fn id(&self) -> DocumentId {
        DocumentId {
            cik: self.cik,
            filing_date: self.filing_date,
        }
    }
}

/// 构建产物，所有矩阵共享 `rows` 的行序与 `vocabulary` 的列序
#[derive(Debug, Clone)]
pub struct MatrixOutputs {
    pub rows: Vec<MatrixRow>,
    pub term_frequency: Array2<f64>,
    /// 0/1 出现标记
    pub presence: Array2<f64>,
    pub document_frequency: Array1<f64>,
    pub idf: Array1<f64>,
    pub tfidf: Array2<f64>,
    /// 词频除以文档长度，空文档为零行
    pub term_weight: Array2<f64>,
    pub document_length: Array1<f64>,
}

impl MatrixOutputs {
    pub fn n_documents(&self) -> usize {
        self.rows.len()
    }

    pub fn n_terms(&self) -> usize {
        self.idf.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatrixReport {
    pub documents: usize,
    pub vocabulary_size: usize,
    /// 词数为 0 的文档（未抽到 MD&A）
    pub empty_documents: usize,
    pub unreadable: usize,
    /// 命中词表的词次总数
    pub vocabulary_hits: u64,
}

/// `ln(N / (1 + df))`，空语料返回全零
pub fn inverse_document_frequency(document_frequency: &Array1<f64>, n_documents: usize) -> Array1<f64> {
    if n_documents == 0 {
        return Array1::zeros(document_frequency.len());
    }
    let n = n_documents as f64;
    document_frequency.mapv(|df| (n / (1.0 + df)).ln())
}

pub struct TermFrequencyMatrixBuilder<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> TermFrequencyMatrixBuilder<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// 按给定顺序构建矩阵，调用方负责语料顺序
    pub fn build<I, S>(&self, documents: I) -> (MatrixOutputs, MatrixReport)
    where
        I: IntoIterator<Item = (FilingKey, S)>,
        S: AsRef<str>,
    {
        let n_terms = self.vocabulary.len();
        let mut report = MatrixReport {
            vocabulary_size: n_terms,
            ..Default::default()
        };

        let mut rows = Vec::new();
        let mut counts_by_row = Vec::new();
        for (key, text) in documents {
            let counts = count_tokens(text.as_ref());
            if counts.total == 0 {
                report.empty_documents += 1;
            }
            rows.push(MatrixRow {
                row: rows.len(),
                cik: key.cik,
                filing_date: key.filing_date,
                form: key.form.clone(),
                file_name: key.file_name(),
                doc_length: counts.total,
            });
            counts_by_row.push(counts);
        }

        let n_documents = rows.len();
        let mut term_frequency = Array2::<f64>::zeros((n_documents, n_terms));
        for (i, counts) in counts_by_row.iter().enumerate() {
            for (token, &count) in &counts.counts {
                if let Some(j) = self.vocabulary.index_of(token) {
                    term_frequency[[i, j]] = count as f64;
                    report.vocabulary_hits += count;
                }
            }
        }

        let document_length: Array1<f64> = rows.iter().map(|r| r.doc_length as f64).collect();
        let presence = term_frequency.mapv(|tf| if tf > 0.0 { 1.0 } else { 0.0 });
        let document_frequency = presence.sum_axis(Axis(0));
        let idf = inverse_document_frequency(&document_frequency, n_documents);
        let tfidf = &term_frequency * &idf;

        let mut term_weight = term_frequency.clone();
        for (mut row, &length) in term_weight.outer_iter_mut().zip(document_length.iter()) {
            if length > 0.0 {
                row.mapv_inplace(|tf| tf / length);
            } else {
                row.fill(0.0);
            }
        }

        report.documents = n_documents;
        let outputs = MatrixOutputs {
            rows,
            term_frequency,
            presence,
            document_frequency,
            idf,
            tfidf,
            term_weight,
            document_length,
        };
        (outputs, report)
    }

    /// 读取抽取目录中的全部文档，按 (cik, filing_date, form) 排序后构建
    pub fn build_from_dir(&self, dir: &Path) -> AppResult<(MatrixOutputs, MatrixReport)> {
        let keys = list_keys(dir)?;
        info!("🧮 开始构建词频矩阵: {} 个文档 × {} 个单词", keys.len(), self.vocabulary.len());

        let mut unreadable = 0;
        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            let path = dir.join(key.file_name());
            match fs::read(&path) {
                Ok(bytes) => documents.push((key, String::from_utf8_lossy(&bytes).into_owned())),
                Err(e) => {
                    warn!("读取抽取结果失败，跳过: {}, err={}", path.display(), e);
                    unreadable += 1;
                }
            }
        }

        let (outputs, mut report) = self.build(documents);
        report.unreadable = unreadable;
        info!(
            "✅ 矩阵构建完成: {} 行 × {} 列, 空文档 {}, 词表命中 {} 次",
            report.documents, report.vocabulary_size, report.empty_documents, report.vocabulary_hits
        );
        Ok((outputs, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::model::{DictionaryEntry, PolarityFlags};
    use approx::assert_relative_eq;

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::from_entries(words.iter().enumerate().map(|(i, w)| DictionaryEntry {
            word: w.to_string(),
            sequence_number: i as u64 + 1,
            word_count: 0,
            polarity: PolarityFlags::default(),
        }))
    }

    fn key(cik: u64) -> FilingKey {
        FilingKey::new(cik, NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(), "10-Q")
    }

    #[test]
    fn test_idf_with_empty_corpus_is_zero() {
        let idf = inverse_document_frequency(&Array1::from(vec![0.0, 0.0]), 0);
        assert_eq!(idf, Array1::from(vec![0.0, 0.0]));
    }

    #[test]
    fn test_zero_length_document_yields_zero_weights() {
        let vocabulary = vocab(&["GOOD"]);
        let builder = TermFrequencyMatrixBuilder::new(&vocabulary);
        let (out, report) = builder.build(vec![(key(1), "good news"), (key(2), "")]);

        assert_eq!(report.empty_documents, 1);
        assert_eq!(out.document_length.to_vec(), vec![2.0, 0.0]);
        assert_relative_eq!(out.term_weight[[0, 0]], 0.5);
        assert_eq!(out.term_weight[[1, 0]], 0.0);
        assert!(out.term_weight.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rows_follow_input_order() {
        let vocabulary = vocab(&["GOOD"]);
        let builder = TermFrequencyMatrixBuilder::new(&vocabulary);
        let (out, _) = builder.build(vec![(key(9), "good"), (key(3), "good good")]);
        assert_eq!(out.rows[0].cik, 9);
        assert_eq!(out.rows[1].row, 1);
        assert_eq!(out.term_frequency[[1, 0]], 2.0);
    }
}
