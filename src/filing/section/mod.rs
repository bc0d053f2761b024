//! MD&A 章节抽取

pub mod extractor;
pub mod markers;
pub mod service;

pub use extractor::{strip_markup, SectionExtractor, TailPolicy};
pub use markers::{MarkerMatch, SectionMarkers};
pub use service::{extract_directory, ExtractionReport};
