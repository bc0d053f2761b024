//! 词频矩阵构建
//!
//! 词典在加载时固定列空间，语料枚举时固定行顺序，之后所有矩阵共用这两套索引。

pub mod builder;
pub mod store;
pub mod tokenizer;
pub mod vocabulary;

pub use builder::{inverse_document_frequency, MatrixOutputs, MatrixReport, MatrixRow, TermFrequencyMatrixBuilder};
pub use store::{MatrixColumn, MatrixStore};
pub use tokenizer::{count_tokens, tokenize, TokenCounts};
pub use vocabulary::{Vocabulary, VocabularyLoadReport, VocabularyScope};
