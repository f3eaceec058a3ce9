use serde::{Deserialize, Serialize};

use super::record::PackingRecord;

/// 记录集合的统计（每次提取/筛选后重新计算）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub today_completed: usize,
}

/// 一次读取或检索的结果：记录 + 统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingSnapshot {
    pub data: Vec<PackingRecord>,
    pub stats: PackingStats,
}
