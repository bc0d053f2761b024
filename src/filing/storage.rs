//! 本地产物读写
//!
//! 所有写入都先落到同目录临时文件，再 rename 到目标路径，失败时不会留下半截文件。

use std::fs;
use std::io::Write;
use std::path::Path;

use ndarray::{ArrayBase, Data, Dimension};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{AppError, AppResult};

/// 在目标文件所在目录创建临时文件，交给 `write` 填充后原子替换
pub fn atomic_write_with<F>(path: &Path, write: F) -> AppResult<()>
where
    F: FnOnce(&mut NamedTempFile) -> AppResult<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

pub fn atomic_write(path: &Path, bytes: &[u8]) -> AppResult<()> {
    atomic_write_with(path, |tmp| {
        tmp.write_all(bytes)?;
        Ok(())
    })
}

/// 写出带表头的 CSV
pub fn write_csv<T, I>(path: &Path, rows: I) -> AppResult<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut written = 0;
    atomic_write_with(path, |tmp| {
        let mut writer = csv::Writer::from_writer(tmp);
        for row in rows {
            writer.serialize(row)?;
            written += 1;
        }
        writer.flush()?;
        Ok(())
    })?;
    Ok(written)
}

/// 读取带表头的 CSV，文件不存在属于配置错误
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    if !path.exists() {
        return Err(AppError::Config(format!("缺少必需文件: {}", path.display())));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn write_npy<S, D>(path: &Path, array: &ArrayBase<S, D>) -> AppResult<()>
where
    S: Data,
    S::Elem: ndarray_npy::WritableElement,
    D: Dimension,
{
    atomic_write_with(path, |tmp| {
        array.write_npy(tmp)?;
        Ok(())
    })
}

pub fn read_npy<T: ReadNpyExt>(path: &Path) -> AppResult<T> {
    let file = fs::File::open(path)?;
    Ok(T::read_npy(file)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &body)
}
