//! 状态统计 - 业务能力层

use chrono::{DateTime, FixedOffset};

use crate::models::{PackingRecord, PackingStats};
use crate::services::coercion::parse_calendar_day;

/// 汇总记录集合
///
/// # 参数
/// - `records`: 记录集合
/// - `now`: 参照时间，"今天"按该时间的时区偏移取日历日
///
/// # 返回
/// 总数、未处理数、完了数，以及梱包日期为今天的完了数。
/// 梱包日期无法解析的记录不计入今天。
pub fn aggregate(records: &[PackingRecord], now: DateTime<FixedOffset>) -> PackingStats {
    let today = now.date_naive();
    let offset = now.offset();

    records.iter().fold(PackingStats::default(), |mut stats, record| {
        stats.total += 1;
        if record.status.is_completed() {
            stats.completed += 1;
            if parse_calendar_day(&record.packing_info.date, offset) == Some(today) {
                stats.today_completed += 1;
            }
        } else {
            stats.pending += 1;
        }
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PackingInfo, PackingStatus};

    fn record(status: PackingStatus, packing_date: &str) -> PackingRecord {
        PackingRecord {
            row_index: 2,
            timestamp: "2025/08/08".to_string(),
            manufacture_date: "2025/08/01".to_string(),
            seasoning_type: String::new(),
            fish_type: String::new(),
            origin: String::new(),
            quantity: 1,
            manufacture_product: String::new(),
            status,
            packing_info: PackingInfo {
                date: packing_date.to_string(),
                ..PackingInfo::default()
            },
        }
    }

    fn at(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn test_empty_collection() {
        let stats = aggregate(&[], at("2025-08-09T12:00:00Z"));
        assert_eq!(stats, PackingStats::default());
    }

    #[test]
    fn test_partition_and_today() {
        let records = vec![
            record(PackingStatus::Completed, "2025-08-09T00:00:00Z"),
            record(PackingStatus::Completed, "2025/08/09 17:45:00"),
            record(PackingStatus::Completed, "2025-08-08T23:00:00Z"),
            record(PackingStatus::Completed, "壊れた日付"),
            record(PackingStatus::Completed, ""),
            // 未処理的记录即使日期是今天也不计入
            record(PackingStatus::Pending, "2025-08-09T01:00:00Z"),
        ];

        let stats = aggregate(&records, at("2025-08-09T12:00:00Z"));

        assert_eq!(stats.total, 6);
        assert_eq!(stats.completed, 5);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.pending + stats.completed, stats.total);
        assert_eq!(stats.today_completed, 2);
    }

    #[test]
    fn test_today_follows_reference_offset() {
        let records = vec![record(PackingStatus::Completed, "2025-08-08T23:00:00Z")];

        // UTC 8/8 23:00 = 日本时间 8/9 08:00
        assert_eq!(aggregate(&records, at("2025-08-09T10:00:00+09:00")).today_completed, 1);
        assert_eq!(aggregate(&records, at("2025-08-09T10:00:00Z")).today_completed, 0);
    }
}
