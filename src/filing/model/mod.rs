//! 管道各阶段之间传递的记录类型

pub mod dictionary;
pub mod document;
pub mod index_record;
pub mod return_record;

pub use dictionary::{DictionaryEntry, PolarityFlags};
pub use document::{DocumentId, ExtractedSection, FilingDocument, FilingKey};
pub use index_record::IndexRecord;
pub use return_record::{DailyReturn, ReturnRecord};
