//! 列布局
//!
//! 逻辑字段 → 表格列地址的映射。不同部署/版本的表格列顺序不一致，
//! 所以布局作为显式的配置值传入提取流程，而不是写死在代码里。

use crate::error::ConfigError;
use crate::sheet::column::{is_column_letter, letter_to_offset, offset_to_letter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 布局中的逻辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    Timestamp,
    ManufactureDate,
    SeasoningType,
    FishType,
    Origin,
    Quantity,
    ManufactureProduct,
    PackingStatus,
    PackingLocation,
    PackingQuantity,
    PackingDate,
    PackingUser,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Timestamp,
        Field::ManufactureDate,
        Field::SeasoningType,
        Field::FishType,
        Field::Origin,
        Field::Quantity,
        Field::ManufactureProduct,
        Field::PackingStatus,
        Field::PackingLocation,
        Field::PackingQuantity,
        Field::PackingDate,
        Field::PackingUser,
    ];

    /// 配置中使用的字段名
    pub fn name(self) -> &'static str {
        match self {
            Field::Timestamp => "TIMESTAMP",
            Field::ManufactureDate => "MANUFACTURE_DATE",
            Field::SeasoningType => "SEASONING_TYPE",
            Field::FishType => "FISH_TYPE",
            Field::Origin => "ORIGIN",
            Field::Quantity => "QUANTITY",
            Field::ManufactureProduct => "MANUFACTURE_PRODUCT",
            Field::PackingStatus => "PACKING_STATUS",
            Field::PackingLocation => "PACKING_LOCATION",
            Field::PackingQuantity => "PACKING_QUANTITY",
            Field::PackingDate => "PACKING_DATE",
            Field::PackingUser => "PACKING_USER",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 列地址：列字母、0 起始下标，或按表头名定位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnAddress {
    Index(usize),
    Letter(String),
    Header { header: String },
}

impl ColumnAddress {
    pub fn letter(letter: &str) -> Self {
        ColumnAddress::Letter(letter.to_string())
    }

    pub fn header(header: &str) -> Self {
        ColumnAddress::Header {
            header: header.to_string(),
        }
    }
}

/// 一个版本的列布局
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// 布局版本名（只用于日志和排查）
    pub version: String,
    pub timestamp: ColumnAddress,
    pub manufacture_date: ColumnAddress,
    pub seasoning_type: ColumnAddress,
    pub fish_type: ColumnAddress,
    pub origin: ColumnAddress,
    pub quantity: ColumnAddress,
    pub manufacture_product: ColumnAddress,
    pub packing_status: ColumnAddress,
    pub packing_location: ColumnAddress,
    pub packing_quantity: ColumnAddress,
    pub packing_date: ColumnAddress,
    pub packing_user: ColumnAddress,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            version: "seasoning-v4".to_string(),
            timestamp: ColumnAddress::letter("A"),
            manufacture_date: ColumnAddress::letter("B"),
            seasoning_type: ColumnAddress::letter("G"),
            origin: ColumnAddress::letter("H"),
            quantity: ColumnAddress::letter("I"),
            fish_type: ColumnAddress::letter("J"),
            manufacture_product: ColumnAddress::letter("AW"),
            packing_status: ColumnAddress::letter("CF"),
            packing_location: ColumnAddress::letter("CG"),
            packing_quantity: ColumnAddress::letter("CH"),
            packing_date: ColumnAddress::letter("CI"),
            packing_user: ColumnAddress::letter("CJ"),
        }
    }
}

impl ColumnLayout {
    /// 获取字段的列地址
    pub fn address(&self, field: Field) -> &ColumnAddress {
        match field {
            Field::Timestamp => &self.timestamp,
            Field::ManufactureDate => &self.manufacture_date,
            Field::SeasoningType => &self.seasoning_type,
            Field::FishType => &self.fish_type,
            Field::Origin => &self.origin,
            Field::Quantity => &self.quantity,
            Field::ManufactureProduct => &self.manufacture_product,
            Field::PackingStatus => &self.packing_status,
            Field::PackingLocation => &self.packing_location,
            Field::PackingQuantity => &self.packing_quantity,
            Field::PackingDate => &self.packing_date,
            Field::PackingUser => &self.packing_user,
        }
    }

    /// 按固定顺序列出全部字段及其地址
    pub fn entries(&self) -> impl Iterator<Item = (Field, &ColumnAddress)> {
        Field::ALL.into_iter().map(move |field| (field, self.address(field)))
    }

    /// 是否有字段需要按表头名定位
    pub fn requires_header(&self) -> bool {
        self.entries()
            .any(|(_, address)| matches!(address, ColumnAddress::Header { .. }))
    }

    /// 解析为数组下标
    ///
    /// # 参数
    /// - `header`: 表头行（第 0 行），只有按表头定位的字段需要
    ///
    /// # 返回
    /// 列字母不合法、表头缺失或两个字段指向同一列时返回配置错误
    pub fn resolve(&self, header: Option<&[String]>) -> Result<ResolvedLayout, ConfigError> {
        let mut offsets = [0usize; Field::ALL.len()];
        let mut seen: BTreeMap<usize, Field> = BTreeMap::new();

        for (field, address) in self.entries() {
            let offset = match address {
                ColumnAddress::Index(index) => *index,
                ColumnAddress::Letter(letter) => {
                    if !is_column_letter(letter) {
                        return Err(ConfigError::InvalidColumnLetter {
                            field: field.name().to_string(),
                            address: letter.clone(),
                        });
                    }
                    letter_to_offset(letter)
                }
                ColumnAddress::Header { header: name } => {
                    let row = header.ok_or_else(|| ConfigError::HeaderRowMissing {
                        version: self.version.clone(),
                    })?;
                    row.iter()
                        .position(|cell| cell.trim() == name.trim())
                        .ok_or_else(|| ConfigError::HeaderNotFound {
                            field: field.name().to_string(),
                            header: name.clone(),
                        })?
                }
            };

            if let Some(first) = seen.insert(offset, field) {
                return Err(ConfigError::DuplicateColumn {
                    first: first.name().to_string(),
                    second: field.name().to_string(),
                    index: offset,
                });
            }
            offsets[field as usize] = offset;
        }

        Ok(ResolvedLayout {
            version: self.version.clone(),
            offsets,
        })
    }
}

/// 已解析的布局：每个字段对应一个 0 起始的数组下标
///
/// 在一次提取过程中保持不变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    version: String,
    offsets: [usize; Field::ALL.len()],
}

impl ResolvedLayout {
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 字段的数组下标
    pub fn offset(&self, field: Field) -> usize {
        self.offsets[field as usize]
    }

    /// 字段的列字母
    pub fn letter(&self, field: Field) -> String {
        offset_to_letter(self.offset(field))
    }

    /// 布局引用到的最大下标
    pub fn max_offset(&self) -> usize {
        self.offsets.iter().copied().max().unwrap_or(0)
    }

    /// 覆盖全部字段的读取范围，例如 `A:CJ`
    pub fn covering_range(&self) -> String {
        format!("A:{}", offset_to_letter(self.max_offset()))
    }
}
