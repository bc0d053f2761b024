use thiserror::Error;

/// 应用错误
///
/// 只有 `Config` 属于致命错误：必需的静态产物缺失时整个运行无法产出有效结果。
/// 单条记录/单个文档的失败不会走到这里，而是在各阶段边界被折算成计数。
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置错误（词典、映射表、合并索引等必需产物缺失）
    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV错误: {0}")]
    Csv(#[from] csv::Error),

    /// 矩阵持久化错误
    #[error("存储错误: {0}")]
    Storage(String),

    #[error("HTTP客户端错误: {0}")]
    Http(String),

    #[error("解析错误: {0}")]
    Parse(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ndarray_npy::WriteNpyError> for AppError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpyError> for AppError {
    fn from(err: ndarray_npy::ReadNpyError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<tempfile::PersistError> for AppError {
    fn from(err: tempfile::PersistError) -> Self {
        AppError::Io(err.error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// 远程抓取错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 资源不存在，不重试
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 可重试的网络错误
    #[error("网络暂时性错误: {0}")]
    Transient(String),
}

/// 索引行解析错误（丢弃并计数）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexLineError {
    #[error("字段数量错误: 期望5个, 实际{0}个")]
    FieldCount(usize),

    #[error("CIK无效: {0}")]
    InvalidCik(String),

    #[error("日期无效: {0}")]
    InvalidDate(String),
}

/// 词典行解析错误（丢弃并计数）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryRowError {
    #[error("缺少单词")]
    EmptyWord,

    #[error("字段 {field} 无效: {value}")]
    InvalidNumber { field: &'static str, value: String },
}
