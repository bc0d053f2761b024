//! 章节抽取
//!
//! 先去掉尖括号标记得到纯文本，再反复向前扫描：起始标记 → 最近的结束标记。
//! 长度不足阈值的片段视为目录引用等误匹配直接丢弃；结束标记之后继续扫描，
//! 同一文档可能多次出现该标题。

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filing::model::{ExtractedSection, FilingDocument};
use crate::filing::section::markers::SectionMarkers;

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("markup pattern"));

pub const DEFAULT_MIN_SECTION_CHARS: usize = 100;

/// 找到起始标记、但其后再无结束标记时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailPolicy {
    /// 丢弃尾部内容并结束扫描
    #[default]
    Discard,
    /// 把起始标记到文末的内容作为一个片段（同样受长度阈值约束）
    CaptureToEnd,
}

impl FromStr for TailPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(TailPolicy::Discard),
            "capture" | "capture_to_end" => Ok(TailPolicy::CaptureToEnd),
            other => Err(format!("未知的 MDA_TAIL_POLICY: {}", other)),
        }
    }
}

/// 去掉 `<...>` 标记，替换为空格
pub fn strip_markup(raw: &str) -> String {
    MARKUP.replace_all(raw, " ").into_owned()
}

#[derive(Debug, Clone)]
pub struct SectionExtractor {
    markers: SectionMarkers,
    min_chars: usize,
    tail_policy: TailPolicy,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new(SectionMarkers::default(), DEFAULT_MIN_SECTION_CHARS, TailPolicy::default())
    }
}

impl SectionExtractor {
    pub fn new(markers: SectionMarkers, min_chars: usize, tail_policy: TailPolicy) -> Self {
        Self {
            markers,
            min_chars,
            tail_policy,
        }
    }

    /// 在纯文本中查找所有被接受的片段（已 trim）
    pub fn find_spans<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while let Some(start) = self.markers.find_start(text, pos) {
            match self.markers.find_end(text, start.end) {
                Some(end) => {
                    self.accept(&text[start.start..end.start], &mut spans);
                    pos = end.end;
                }
                None => {
                    if self.tail_policy == TailPolicy::CaptureToEnd {
                        self.accept(&text[start.start..], &mut spans);
                    }
                    break;
                }
            }
        }
        spans
    }

    fn accept<'t>(&self, span: &'t str, spans: &mut Vec<&'t str>) {
        if span.chars().count() < self.min_chars {
            return;
        }
        let trimmed = span.trim();
        if !trimmed.is_empty() {
            spans.push(trimmed);
        }
    }

    /// 原始文本 → (拼接后的章节文本, 片段数)
    pub fn extract_text(&self, raw: &str) -> (String, usize) {
        let plain = strip_markup(raw);
        let spans = self.find_spans(&plain);
        (spans.join("\n\n"), spans.len())
    }

    pub fn extract(&self, document: &FilingDocument) -> ExtractedSection {
        let (section_text, section_count) = self.extract_text(&document.text());
        ExtractedSection {
            key: document.key.clone(),
            section_text,
            section_count,
        }
    }
}
