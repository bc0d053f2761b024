//! 批量抽取：缓存目录 → 清洗目录
//!
//! 每个缓存文档对应一个同名输出文件，未定位到 MD&A 时写出空文件，
//! 下游矩阵构建依此保持与缓存一致的语料顺序。

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::filing::fetch::cache::DocumentCache;
use crate::filing::section::extractor::SectionExtractor;
use crate::filing::storage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub documents: usize,
    /// 至少抽到一个片段
    pub extracted: usize,
    /// 未定位到 MD&A，写出空文件
    pub empty: usize,
    /// 输出已存在且未要求覆盖
    pub skipped: usize,
    /// 读取或写入失败
    pub unreadable: usize,
}

/// 对 `input_dir` 中的每个缓存文档做抽取，结果写入 `output_dir`
pub fn extract_directory(
    extractor: &SectionExtractor,
    input_dir: &Path,
    output_dir: &Path,
    force: bool,
) -> AppResult<ExtractionReport> {
    let cache = DocumentCache::new(input_dir);
    let keys = cache.keys()?;
    fs::create_dir_all(output_dir)?;
    info!("✂️ 开始抽取 MD&A: {} 个文档, 输出 {}", keys.len(), output_dir.display());

    let mut report = ExtractionReport {
        documents: keys.len(),
        ..Default::default()
    };

    for key in &keys {
        let output = output_dir.join(key.file_name());
        if output.is_file() && !force {
            report.skipped += 1;
            continue;
        }

        let document = match cache.load(key) {
            Ok(document) => document,
            Err(e) => {
                warn!("读取缓存文档失败: {}, err={}", key, e);
                report.unreadable += 1;
                continue;
            }
        };

        let section = extractor.extract(&document);
        if let Err(e) = storage::atomic_write(&output, section.section_text.as_bytes()) {
            warn!("写出抽取结果失败: {}, err={}", output.display(), e);
            report.unreadable += 1;
            continue;
        }

        if section.is_empty() {
            report.empty += 1;
        } else {
            report.extracted += 1;
        }
    }

    info!(
        "✅ 抽取完成: 有效 {}, 空 {}, 跳过 {}, 失败 {}",
        report.extracted, report.empty, report.skipped, report.unreadable
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_directory_writes_one_file_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("downloads");
        let output = dir.path().join("cleaned");
        fs::create_dir_all(&input).unwrap();

        let body = "word ".repeat(40);
        fs::write(
            input.join("1_2019-05-01_10-Q.txt"),
            format!("Discussion and Analysis of Financial Condition {} Controls and Procedures", body),
        )
        .unwrap();
        fs::write(input.join("2_2019-05-02_10-Q.txt"), "nothing relevant here").unwrap();
        fs::write(input.join("README.md"), "ignored").unwrap();

        let extractor = SectionExtractor::default();
        let report = extract_directory(&extractor, &input, &output, false).unwrap();
        assert_eq!(report.documents, 2);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.empty, 1);
        assert_eq!(fs::read_to_string(output.join("2_2019-05-02_10-Q.txt")).unwrap(), "");

        let again = extract_directory(&extractor, &input, &output, false).unwrap();
        assert_eq!(again.skipped, 2);

        let forced = extract_directory(&extractor, &input, &output, true).unwrap();
        assert_eq!(forced.skipped, 0);
        assert_eq!(forced.extracted, 1);
    }
}
