use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 索引周期：(年份, 季度)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        if (1..=4).contains(&quarter) {
            Some(Self { year, quarter })
        } else {
            None
        }
    }

    /// 年份区间 × 季度列表的全部组合，按时间排序
    pub fn expand(start_year: i32, end_year: i32, quarters: &[u8]) -> Vec<Period> {
        let mut periods: Vec<Period> = (start_year..=end_year)
            .flat_map(|year| quarters.iter().filter_map(move |q| Period::new(year, *q)))
            .collect();
        periods.sort();
        periods.dedup();
        periods
    }

    /// `2019/QTR1`
    pub fn relative_dir(&self) -> String {
        format!("{}/QTR{}", self.year, self.quarter)
    }

    pub fn index_url(&self, full_index_root: &str) -> String {
        format!(
            "{}/{}/master.idx",
            full_index_root.trim_end_matches('/'),
            self.relative_dir()
        )
    }

    pub fn local_path(&self, index_dir: &Path) -> PathBuf {
        index_dir
            .join(self.year.to_string())
            .join(format!("QTR{}", self.quarter))
            .join("master.idx")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for Period {
    type Err = String;

    /// 支持 `2019Q1` / `2019-Q1` / `2019-1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let (year, quarter) = upper
            .split_once('Q')
            .or_else(|| upper.split_once('-'))
            .ok_or_else(|| format!("周期格式无效: {}", s))?;
        let year = year
            .trim_end_matches('-')
            .parse::<i32>()
            .map_err(|_| format!("年份无效: {}", s))?;
        let quarter = quarter.parse::<u8>().map_err(|_| format!("季度无效: {}", s))?;
        Period::new(year, quarter).ok_or_else(|| format!("季度必须在1-4之间: {}", s))
    }
}
