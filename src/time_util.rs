use chrono::NaiveDate;

/// 规范日期格式 YYYY-MM-DD
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析申报日期，支持 `2019-05-01` 与 `20190501` 两种写法
pub fn parse_filing_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, CANONICAL_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// 年份区间转换为闭区间日期：[start_year-01-01, end_year-12-31]
pub fn year_bounds(start_year: i32, end_year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(start_year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(end_year, 12, 31)?;
    Some((start, end))
}
