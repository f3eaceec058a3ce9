//! 记录提取 - 业务能力层
//!
//! 把一行按位置寻址的原始单元格映射为 `PackingRecord`。

use chrono::{FixedOffset, NaiveDate};
use tracing::debug;

use crate::models::{Field, PackingInfo, PackingRecord, PackingStatus, ResolvedLayout};
use crate::services::coercion::{cell, normalize_date, parse_calendar_day, parse_quantity};
use crate::sheet::RawRow;

/// 记录提取器
///
/// 职责：
/// - 时间戳为空的行直接跳过（不是错误）
/// - 越界的列视为空字符串
/// - 数量/日期格式错误时使用兜底值，不影响其他行
/// - 状态只由状态列是否等于完了标记决定
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    layout: ResolvedLayout,
    completion_marker: String,
    offset: FixedOffset,
    min_manufacture_date: Option<NaiveDate>,
}

impl RecordExtractor {
    /// 创建新的提取器
    ///
    /// # 参数
    /// - `layout`: 已解析的列布局
    /// - `completion_marker`: 状态列中表示完了的文本
    /// - `offset`: 带时区时间换算为日期时使用的偏移
    pub fn new(layout: ResolvedLayout, completion_marker: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            layout,
            completion_marker: completion_marker.into(),
            offset,
            min_manufacture_date: None,
        }
    }

    /// 设置制造日下限，更早的行不参与提取
    pub fn with_min_manufacture_date(mut self, date: Option<NaiveDate>) -> Self {
        self.min_manufacture_date = date;
        self
    }

    pub fn layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    /// 提取一行
    ///
    /// # 参数
    /// - `row`: 原始单元格
    /// - `row_index`: 该行在表格中的行号（1 起始）
    ///
    /// # 返回
    /// 该行应跳过时返回 None
    pub fn extract(&self, row: &[String], row_index: u32) -> Option<PackingRecord> {
        let field = |f: Field| cell(row, self.layout.offset(f));

        let timestamp = field(Field::Timestamp);
        if timestamp.trim().is_empty() {
            debug!("第 {} 行时间戳为空，跳过", row_index);
            return None;
        }

        let manufacture_date_raw = field(Field::ManufactureDate);
        if let Some(min_date) = self.min_manufacture_date {
            if let Some(date) = parse_calendar_day(manufacture_date_raw, &self.offset) {
                if date < min_date {
                    debug!("第 {} 行制造日 {} 早于 {}，跳过", row_index, date, min_date);
                    return None;
                }
            }
        }

        let status = if field(Field::PackingStatus) == self.completion_marker {
            PackingStatus::Completed
        } else {
            PackingStatus::Pending
        };

        Some(PackingRecord {
            row_index,
            timestamp: normalize_date(timestamp, &self.offset),
            manufacture_date: normalize_date(manufacture_date_raw, &self.offset),
            seasoning_type: field(Field::SeasoningType).to_string(),
            fish_type: field(Field::FishType).to_string(),
            origin: field(Field::Origin).to_string(),
            quantity: parse_quantity(field(Field::Quantity)),
            manufacture_product: field(Field::ManufactureProduct).to_string(),
            status,
            packing_info: PackingInfo {
                location: field(Field::PackingLocation).to_string(),
                quantity: field(Field::PackingQuantity).to_string(),
                date: field(Field::PackingDate).to_string(),
                user: field(Field::PackingUser).to_string(),
            },
        })
    }

    /// 提取整张表（第 0 行为表头，不参与提取）
    ///
    /// 行号 = 数组下标 + 1，重新读取同一张表时保持不变。
    pub fn extract_all(&self, rows: &[RawRow]) -> Vec<PackingRecord> {
        let records: Vec<PackingRecord> = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(position, row)| self.extract(row, position as u32 + 1))
            .collect();

        debug!(
            "布局 {}: {} 行数据, 提取 {} 条记录",
            self.layout.version(),
            rows.len().saturating_sub(1),
            records.len()
        );

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnAddress, ColumnLayout};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn default_extractor() -> RecordExtractor {
        let layout = ColumnLayout::default().resolve(None).unwrap();
        RecordExtractor::new(layout, "完了", utc())
    }

    /// 按默认布局构造一行（长度 88，对应 A:CJ）
    fn row(timestamp: &str, status: &str, quantity: &str) -> RawRow {
        let mut row = vec![String::new(); 88];
        row[0] = timestamp.to_string();
        row[1] = "2025-08-01".to_string();
        row[6] = "醤油".to_string();
        row[7] = "国産".to_string();
        row[8] = quantity.to_string();
        row[9] = "鯖".to_string();
        row[48] = "鯖醤油漬け".to_string();
        row[83] = status.to_string();
        row
    }

    #[test]
    fn test_extract_full_row() {
        let mut raw = row("2025-08-08", "完了", "12");
        raw[84] = "パレット①".to_string();
        raw[85] = "12".to_string();
        raw[86] = "2025-08-09T00:00:00Z".to_string();
        raw[87] = "田中".to_string();

        let record = default_extractor().extract(&raw, 2).unwrap();

        assert_eq!(record.row_index, 2);
        assert_eq!(record.timestamp, "2025/08/08");
        assert_eq!(record.manufacture_date, "2025/08/01");
        assert_eq!(record.seasoning_type, "醤油");
        assert_eq!(record.origin, "国産");
        assert_eq!(record.fish_type, "鯖");
        assert_eq!(record.quantity, 12);
        assert_eq!(record.manufacture_product, "鯖醤油漬け");
        assert_eq!(record.status, PackingStatus::Completed);
        assert_eq!(record.packing_info.location, "パレット①");
        assert_eq!(record.packing_info.date, "2025-08-09T00:00:00Z");
        assert_eq!(record.packing_info.user, "田中");
    }

    #[test]
    fn test_empty_timestamp_is_skipped() {
        let extractor = default_extractor();
        assert!(extractor.extract(&row("", "完了", "1"), 2).is_none());
        assert!(extractor.extract(&row("  ", "", "1"), 3).is_none());
        assert!(extractor.extract(&[], 4).is_none());
    }

    #[test]
    fn test_short_row_reads_empty_cells() {
        // 只有前两列的旧数据：数量为 0，状态为未处理，梱包信息为空
        let raw = vec!["2025-08-08".to_string(), "2025-08-01".to_string()];
        let record = default_extractor().extract(&raw, 5).unwrap();

        assert_eq!(record.quantity, 0);
        assert_eq!(record.status, PackingStatus::Pending);
        assert_eq!(record.packing_info, PackingInfo::default());
        assert_eq!(record.manufacture_product, "");
    }

    #[test]
    fn test_status_requires_exact_marker() {
        let extractor = default_extractor();
        assert_eq!(
            extractor.extract(&row("2025-08-08", "完了 ", "1"), 2).unwrap().status,
            PackingStatus::Pending
        );
        assert_eq!(
            extractor.extract(&row("2025-08-08", "未処理", "1"), 2).unwrap().status,
            PackingStatus::Pending
        );
    }

    #[test]
    fn test_malformed_cells_fall_back() {
        let mut raw = row("2025-08-08", "", "たくさん");
        raw[1] = "不明".to_string();

        let record = default_extractor().extract(&raw, 2).unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(record.manufacture_date, "不明");
    }

    #[test]
    fn test_extract_all_skips_header_and_keeps_row_numbers() {
        let rows = vec![
            vec!["タイムスタンプ".to_string(), "製造日".to_string()],
            row("2025-08-08", "", "1"),
            row("", "", "2"),
            row("2025-08-09", "完了", "3"),
        ];

        let records = default_extractor().extract_all(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_index, 2);
        assert_eq!(records[1].row_index, 4);
        assert_eq!(records[1].quantity, 3);
    }

    #[test]
    fn test_extract_all_empty_sheet() {
        assert!(default_extractor().extract_all(&[]).is_empty());
    }

    #[test]
    fn test_min_manufacture_date_cutoff() {
        let extractor =
            default_extractor().with_min_manufacture_date(NaiveDate::from_ymd_opt(2025, 8, 8));

        let mut early = row("2025-08-08", "", "1");
        early[1] = "2025-08-07".to_string();
        let mut on_cutoff = row("2025-08-08", "", "1");
        on_cutoff[1] = "2025/08/08".to_string();
        let mut unknown = row("2025-08-08", "", "1");
        unknown[1] = String::new();

        assert!(extractor.extract(&early, 2).is_none());
        assert!(extractor.extract(&on_cutoff, 3).is_some());
        assert!(extractor.extract(&unknown, 4).is_some());
    }

    #[test]
    fn test_custom_index_layout() {
        let layout = ColumnLayout {
            packing_status: ColumnAddress::Index(3),
            packing_location: ColumnAddress::Index(4),
            packing_quantity: ColumnAddress::Index(5),
            packing_date: ColumnAddress::Index(10),
            packing_user: ColumnAddress::Index(11),
            seasoning_type: ColumnAddress::Index(2),
            origin: ColumnAddress::Index(12),
            quantity: ColumnAddress::Index(13),
            fish_type: ColumnAddress::Index(14),
            manufacture_product: ColumnAddress::Index(15),
            ..ColumnLayout::default()
        }
        .resolve(None)
        .unwrap();
        let extractor = RecordExtractor::new(layout, "済", utc());

        let raw: RawRow = ["2025-08-08", "2025-08-01", "塩", "済", "台車", "4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let record = extractor.extract(&raw, 7).unwrap();

        assert_eq!(record.status, PackingStatus::Completed);
        assert_eq!(record.seasoning_type, "塩");
        assert_eq!(record.packing_info.location, "台車");
        assert_eq!(record.packing_info.quantity, "4");
        assert_eq!(record.packing_info.user, "");
    }
}
