use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::sheet::column::letter_to_offset;

/// 范围解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("范围格式不合法 '{0}'")]
    FormatError(String),
}

/// 表格风格的范围，例如 `A:CJ`、`1:1`、`B2:C5`、`'修正用シート'!A:CJ`
///
/// 所有边界都是 0 起始下标，None 表示不限。
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub row_lower_bound: Option<usize>,
    pub row_upper_bound: Option<usize>,
    pub col_lower_bound: Option<usize>,
    pub col_upper_bound: Option<usize>,
}

impl Range {
    /// 行是否在范围内
    pub fn contains_row(&self, row: usize) -> bool {
        self.row_lower_bound.map_or(true, |lower| row >= lower)
            && self.row_upper_bound.map_or(true, |upper| row <= upper)
    }

    /// 列是否在范围内
    pub fn contains_col(&self, col: usize) -> bool {
        self.col_lower_bound.map_or(true, |lower| col >= lower)
            && self.col_upper_bound.map_or(true, |upper| col <= upper)
    }
}

impl TryFrom<&str> for Range {
    type Error = RangeError;

    /// 解析范围字符串；带工作表名时只取 `!` 之后的部分
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^([A-Z]{0,3})(\d*)(:([A-Z]{0,3})(\d*))?$").expect("Hardcode regex pattern")
        });

        let reference = value.rsplit_once('!').map_or(value, |(_, range)| range);
        let reference = reference.to_ascii_uppercase();
        let captures = pattern
            .captures(reference.as_str())
            .ok_or_else(|| RangeError::FormatError(value.to_string()))?;

        let col = |index: usize| {
            captures
                .get(index)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(letter_to_offset)
        };
        let row = |index: usize| {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(|row| row.checked_sub(1))
        };

        let mut range = Range {
            col_lower_bound: col(1),
            row_lower_bound: row(2),
            col_upper_bound: col(4),
            row_upper_bound: row(5),
        };
        // 单个单元格或单列/单行（没有 ":"）时上下界相同
        if captures.get(3).is_none() {
            range.col_upper_bound = range.col_lower_bound;
            range.row_upper_bound = range.row_lower_bound;
        }
        Ok(range)
    }
}
