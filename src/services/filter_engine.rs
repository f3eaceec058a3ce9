//! 条件检索 - 业务能力层
//!
//! 所有提供的条件按 AND 组合；未提供（含空字符串）的条件恒为真。

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use crate::models::{FilterCriteria, PackingRecord, PackingSnapshot, PackingStatus, TextField};
use crate::services::coercion::parse_calendar_day;
use crate::services::stats_aggregator::aggregate;

/// 检索引擎
#[derive(Debug, Clone)]
pub struct FilterEngine {
    text_field: TextField,
    offset: FixedOffset,
    completion_marker: String,
}

/// 预先解析好的条件
struct Predicates {
    /// 外层 None = 未提供；内层 None = 提供了但无法解析（不匹配任何记录）
    date: Option<Option<NaiveDate>>,
    text: Option<String>,
    status: Option<Option<PackingStatus>>,
    quantity_min: u64,
    quantity_max: u64,
}

impl FilterEngine {
    pub fn new(text_field: TextField, offset: FixedOffset) -> Self {
        Self {
            text_field,
            offset,
            completion_marker: PackingStatus::Completed.label().to_string(),
        }
    }

    /// 状态列使用自定义完了标记时，按该标记检索也视为完了
    pub fn with_completion_marker(mut self, marker: impl Into<String>) -> Self {
        self.completion_marker = marker.into();
        self
    }

    /// 按条件筛选，返回匹配的记录（无匹配时为空）
    pub fn filter(&self, records: &[PackingRecord], criteria: &FilterCriteria) -> Vec<PackingRecord> {
        let predicates = self.predicates(criteria);
        records
            .iter()
            .filter(|record| self.matches(record, &predicates))
            .cloned()
            .collect()
    }

    /// 筛选 → 统计 → 分页
    ///
    /// 统计针对筛选后的全部记录，分页只影响返回的 `data`。
    pub fn search(
        &self,
        records: &[PackingRecord],
        criteria: &FilterCriteria,
        now: DateTime<FixedOffset>,
    ) -> PackingSnapshot {
        let filtered = self.filter(records, criteria);
        let stats = aggregate(&filtered, now);

        debug!(
            "检索: {} 条中匹配 {} 条 (条件: {:?})",
            records.len(),
            filtered.len(),
            criteria
        );

        let offset = criteria.offset.unwrap_or(0) as usize;
        let limit = criteria.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let data = filtered.into_iter().skip(offset).take(limit).collect();

        PackingSnapshot { data, stats }
    }

    fn predicates(&self, criteria: &FilterCriteria) -> Predicates {
        Predicates {
            date: criteria
                .date()
                .map(|date| parse_calendar_day(date, &self.offset)),
            text: criteria.text().map(|text| text.to_lowercase()),
            status: criteria.status().map(|status| {
                if status == self.completion_marker {
                    Some(PackingStatus::Completed)
                } else {
                    PackingStatus::parse(status)
                }
            }),
            quantity_min: criteria.quantity_min.unwrap_or(0),
            quantity_max: criteria.quantity_max.unwrap_or(u64::MAX),
        }
    }

    fn matches(&self, record: &PackingRecord, predicates: &Predicates) -> bool {
        if let Some(date) = &predicates.date {
            let record_date = parse_calendar_day(&record.manufacture_date, &self.offset);
            if date.is_none() || record_date != *date {
                return false;
            }
        }

        if let Some(text) = &predicates.text {
            let value = self.text_field.value(record).to_lowercase();
            if !value.contains(text.as_str()) {
                return false;
            }
        }

        if let Some(status) = &predicates.status {
            if *status != Some(record.status) {
                return false;
            }
        }

        (predicates.quantity_min..=predicates.quantity_max).contains(&record.quantity)
    }
}
