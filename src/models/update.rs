use serde::{Deserialize, Serialize};

use super::layout::Field;
use crate::sheet::column::CellAddress;

/// 梱包更新内容（操作员录入）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub location: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl UpdatePayload {
    pub fn new(location: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            quantity: quantity.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// 更新请求：目标行 + 更新内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// 1 起始的表格行号（未校验，可能为 0 或负数）
    pub row_index: i64,
    pub packing_data: UpdatePayload,
}

impl UpdateRequest {
    pub fn new(row_index: i64, packing_data: UpdatePayload) -> Self {
        Self {
            row_index,
            packing_data,
        }
    }
}

/// 一次单元格写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    #[serde(with = "address_serde")]
    pub address: CellAddress,
    pub value: String,
    /// 该单元格对应的布局字段（按行提交的后端据此还原更新内容）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl CellWrite {
    pub fn new(address: CellAddress, value: impl Into<String>) -> Self {
        Self {
            address,
            value: value.into(),
            field: None,
        }
    }

    pub fn for_field(field: Field, address: CellAddress, value: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            ..Self::new(address, value)
        }
    }
}

/// 写入协作方的确认结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub updated_cells: usize,
    pub updated_ranges: Vec<String>,
}

/// 一次更新的结果：执行的写入计划 + 协作方确认
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub row_index: u32,
    pub writes: Vec<CellWrite>,
    pub outcome: WriteOutcome,
}

/// 批量更新中失败的那一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub row_index: u32,
    pub error: String,
}

/// 批量更新报告：已完成的更新，以及中断处（如有）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub completed: Vec<UpdateResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<BatchFailure>,
}

impl BatchReport {
    /// 全部写入成功
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

// 地址以 A1 形式序列化，例如 "CF12"
mod address_serde {
    use crate::sheet::column::{is_column_letter, CellAddress};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(address: &CellAddress, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(address)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<CellAddress, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let split = raw
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| de::Error::custom(format!("missing row number: {raw}")))?;
        let (column, row) = raw.split_at(split);
        if !is_column_letter(column) {
            return Err(de::Error::custom(format!("invalid column: {raw}")));
        }
        let row = row
            .parse::<u32>()
            .map_err(|_| de::Error::custom(format!("invalid row: {raw}")))?;
        Ok(CellAddress::new(column, row))
    }
}
