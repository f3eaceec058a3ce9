use serde::{Deserialize, Serialize};
use std::fmt;

/// 梱包状态（由状态列推导，不单独存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackingStatus {
    /// 未处理
    #[serde(rename = "未処理")]
    Pending,
    /// 完了
    #[serde(rename = "完了")]
    Completed,
}

impl PackingStatus {
    /// 表格与接口中使用的标签
    pub fn label(self) -> &'static str {
        match self {
            PackingStatus::Pending => "未処理",
            PackingStatus::Completed => "完了",
        }
    }

    /// 从标签或英文名解析（英文名忽略大小写）
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value {
            "未処理" => return Some(PackingStatus::Pending),
            "完了" => return Some(PackingStatus::Completed),
            _ => {}
        }
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(PackingStatus::Pending),
            "completed" => Some(PackingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_completed(self) -> bool {
        self == PackingStatus::Completed
    }
}

impl fmt::Display for PackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 梱包信息（操作员录入的原始值，缺失时均为空字符串）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingInfo {
    pub location: String,
    pub quantity: String,
    pub date: String,
    pub user: String,
}

/// 梱包记录：表格中的一行（一个生产批次）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingRecord {
    /// 表格中的行号（1 起始，含表头），更新时用它定位
    pub row_index: u32,
    pub timestamp: String,
    pub manufacture_date: String,
    pub seasoning_type: String,
    pub fish_type: String,
    pub origin: String,
    pub quantity: u64,
    pub manufacture_product: String,
    pub status: PackingStatus,
    pub packing_info: PackingInfo,
}
