//! 单元格值的容错转换
//!
//! 单个单元格格式错误不能中断整张表的提取：每个转换函数都有固定的兜底值。
//! - 数量：无法解析 → 0
//! - 日期：空 → 空字符串；无法解析 → 原样保留
//! - 日历日：无法解析 → None（统计/筛选时视为"不匹配"）

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

/// 规范化后的日期显示格式
pub const DATE_FORMAT: &str = "%Y/%m/%d";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

// 表格序列日期的合理区间（约 1954 年 ~ 2119 年），区间外的数字不当作日期
const SERIAL_DATE_RANGE: std::ops::RangeInclusive<f64> = 20_000.0..=80_000.0;

/// 按下标取单元格，越界视为空字符串
pub fn cell(row: &[String], offset: usize) -> &str {
    row.get(offset).map(String::as_str).unwrap_or("")
}

/// 解析数量：取开头的整数部分（"10個" → 10），负数或无法解析 → 0
pub fn parse_quantity(raw: &str) -> u64 {
    let value = raw.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    if value.starts_with('-') {
        return 0;
    }

    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..digits_end].parse::<u64>().unwrap_or(0)
}

/// 解析为日历日
///
/// 带时区的时间（RFC 3339）先换算到 `offset` 再取日期；不带时区的时间与日期直接取日期。
pub fn parse_calendar_day(raw: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(offset).date_naive());
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    parse_serial_date(value)
}

/// 表格序列日期（1900 纪元，以 1899-12-30 为第 0 天）
fn parse_serial_date(value: &str) -> Option<NaiveDate> {
    let serial = value.parse::<f64>().ok()?;
    if !SERIAL_DATE_RANGE.contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// 规范化日期为 `YYYY/MM/DD`；空 → 空字符串，无法解析 → 原样返回
pub fn normalize_date(raw: &str, offset: &FixedOffset) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    match parse_calendar_day(raw, offset) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("10"), 10);
        assert_eq!(parse_quantity(" 42 "), 42);
        assert_eq!(parse_quantity("10個"), 10);
        assert_eq!(parse_quantity("5.9"), 5);
        assert_eq!(parse_quantity("+7"), 7);
        assert_eq!(parse_quantity("-3"), 0);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("99999999999999999999999"), 0);
    }

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 87), "");
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("2025-08-08", &utc()), "2025/08/08");
        assert_eq!(normalize_date("2025/8/1", &utc()), "2025/08/01");
        assert_eq!(normalize_date("2025/08/08 14:03:11", &utc()), "2025/08/08");
        assert_eq!(normalize_date("2025年8月8日", &utc()), "2025/08/08");
        assert_eq!(normalize_date("45877", &utc()), "2025/08/08");
    }

    #[test]
    fn test_normalize_date_fallbacks() {
        assert_eq!(normalize_date("", &utc()), "");
        assert_eq!(normalize_date("   ", &utc()), "");
        assert_eq!(normalize_date("お盆明け", &utc()), "お盆明け");
        assert_eq!(normalize_date("12", &utc()), "12");
    }

    #[test]
    fn test_rfc3339_uses_offset() {
        // UTC 的 8/8 15:30 在日本时间已经是 8/9
        let raw = "2025-08-08T15:30:00Z";
        assert_eq!(
            parse_calendar_day(raw, &utc()),
            NaiveDate::from_ymd_opt(2025, 8, 8)
        );
        assert_eq!(
            parse_calendar_day(raw, &jst()),
            NaiveDate::from_ymd_opt(2025, 8, 9)
        );
    }
}
