//! 章节起止标记匹配

use once_cell::sync::Lazy;
use regex::Regex;

static MDA_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)discussion\s+and\s+analysis\s+of\s+financial\s+condition\b").expect("mda start pattern")
});

static MDA_ENDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)quantitative\s+and\s+qualitative\s+disclosures?\s+about\s+market\s+risk")
            .expect("market risk pattern"),
        Regex::new(r"(?i)controls\s+and\s+procedures").expect("controls pattern"),
    ]
});

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", pattern))
}

/// 一次匹配的字节区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    pub start: usize,
    pub end: usize,
}

/// 起始标记 + 多个候选结束标记
#[derive(Debug, Clone)]
pub struct SectionMarkers {
    start: Regex,
    ends: Vec<Regex>,
}

impl Default for SectionMarkers {
    /// MD&A：起于 "discussion and analysis of financial condition"，
    /// 止于市场风险披露或控制与程序章节
    fn default() -> Self {
        Self {
            start: MDA_START.clone(),
            ends: MDA_ENDS.clone(),
        }
    }
}

impl SectionMarkers {
    /// 自定义标记，均按大小写不敏感编译
    pub fn new(start: &str, ends: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            start: case_insensitive(start)?,
            ends: ends
                .iter()
                .map(|pattern| case_insensitive(pattern))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    /// 从 `from` 起查找下一个起始标记
    pub fn find_start(&self, text: &str, from: usize) -> Option<MarkerMatch> {
        self.start.find_at(text, from).map(|m| MarkerMatch {
            start: m.start(),
            end: m.end(),
        })
    }

    /// 从 `from` 起查找最近的结束标记（所有候选中位置最靠前的）
    pub fn find_end(&self, text: &str, from: usize) -> Option<MarkerMatch> {
        self.ends
            .iter()
            .filter_map(|re| re.find_at(text, from))
            .min_by_key(|m| m.start())
            .map(|m| MarkerMatch {
                start: m.start(),
                end: m.end(),
            })
    }
}
