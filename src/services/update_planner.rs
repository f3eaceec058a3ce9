//! 更新计划 - 业务能力层
//!
//! 把"某行已梱包"的请求投影为具体的单元格写入，不直接访问表格。

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::error::ValidationError;
use crate::models::{CellWrite, Field, ResolvedLayout, UpdatePayload};
use crate::sheet::column::CellAddress;

/// 更新计划器
///
/// 每次计划固定产生 5 个写入：状态、保管场所、保管数量、梱包日时、担当者。
/// 对同一行重复应用同一内容得到相同的写入（幂等）。
#[derive(Debug, Clone)]
pub struct UpdatePlanner {
    status_column: String,
    location_column: String,
    quantity_column: String,
    date_column: String,
    user_column: String,
    completion_marker: String,
    default_user: String,
}

impl UpdatePlanner {
    /// 创建新的更新计划器
    ///
    /// # 参数
    /// - `layout`: 已解析的列布局（只用到梱包相关的 5 列）
    /// - `completion_marker`: 写入状态列的完了标记
    /// - `default_user`: 请求未指定担当者时写入的值
    pub fn new(
        layout: &ResolvedLayout,
        completion_marker: impl Into<String>,
        default_user: impl Into<String>,
    ) -> Self {
        Self {
            status_column: layout.letter(Field::PackingStatus),
            location_column: layout.letter(Field::PackingLocation),
            quantity_column: layout.letter(Field::PackingQuantity),
            date_column: layout.letter(Field::PackingDate),
            user_column: layout.letter(Field::PackingUser),
            completion_marker: completion_marker.into(),
            default_user: default_user.into(),
        }
    }

    /// 生成写入计划
    ///
    /// # 参数
    /// - `row_index`: 目标行号（1 起始）
    /// - `payload`: 更新内容
    /// - `now`: 写入时间戳
    ///
    /// # 返回
    /// 行号不是正整数、保管场所或数量为空时返回校验错误
    pub fn plan(
        &self,
        row_index: i64,
        payload: &UpdatePayload,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<CellWrite>, ValidationError> {
        let row = validate(row_index, payload)?;

        let user = payload
            .user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.default_user);
        let written_at = now.to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(vec![
            CellWrite::for_field(
                Field::PackingStatus,
                CellAddress::new(&self.status_column, row),
                &self.completion_marker,
            ),
            CellWrite::for_field(
                Field::PackingLocation,
                CellAddress::new(&self.location_column, row),
                &payload.location,
            ),
            CellWrite::for_field(
                Field::PackingQuantity,
                CellAddress::new(&self.quantity_column, row),
                &payload.quantity,
            ),
            CellWrite::for_field(
                Field::PackingDate,
                CellAddress::new(&self.date_column, row),
                written_at,
            ),
            CellWrite::for_field(
                Field::PackingUser,
                CellAddress::new(&self.user_column, row),
                user,
            ),
        ])
    }
}

/// 校验更新请求，返回可用的行号
pub fn validate(row_index: i64, payload: &UpdatePayload) -> Result<u32, ValidationError> {
    let row = u32::try_from(row_index)
        .ok()
        .filter(|row| *row >= 1)
        .ok_or(ValidationError::InvalidRowIndex(row_index))?;

    if payload.location.trim().is_empty() {
        return Err(ValidationError::EmptyLocation);
    }
    if payload.quantity.trim().is_empty() {
        return Err(ValidationError::EmptyQuantity);
    }

    Ok(row)
}
