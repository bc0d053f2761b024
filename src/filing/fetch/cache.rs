//! 本地文档缓存
//!
//! 每个文档一个文件，文件名由 (cik, filing_date, form) 确定，
//! 文件存在即视为已缓存。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppResult;
use crate::filing::model::{FilingDocument, FilingKey};

#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &FilingKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn contains(&self, key: &FilingKey) -> bool {
        self.path_for(key).is_file()
    }

    pub fn load(&self, key: &FilingKey) -> AppResult<FilingDocument> {
        let local_path = self.path_for(key);
        let raw_text = fs::read(&local_path)?;
        Ok(FilingDocument {
            key: key.clone(),
            raw_text,
            local_path,
        })
    }

    /// 列出缓存中所有符合命名规则的文档，按键排序
    pub fn keys(&self) -> AppResult<Vec<FilingKey>> {
        list_keys(&self.dir)
    }
}

/// 列出目录中所有 `{cik}_{date}_{form}.txt` 文件对应的键，目录不存在时返回空
pub fn list_keys(dir: &Path) -> AppResult<Vec<FilingKey>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut keys = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(key) = entry.file_name().to_str().and_then(FilingKey::from_file_name) {
            keys.push(key);
        }
    }
    keys.sort();
    Ok(keys)
}
