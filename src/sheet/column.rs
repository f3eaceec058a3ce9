//! 列地址换算
//!
//! 表格列字母（A, B, …, Z, AA, …）与列号之间的互相转换。
//! 列字母的合法性在配置边界（`ColumnLayout::resolve`）统一校验，这里不逐行检查。

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// 列字母 → 1 起始的列号（"A" → 1, "Z" → 26, "AA" → 27）
///
/// 调用方需减 1 得到数组下标。输入必须是非空的大写字母序列。
pub fn letter_to_index(letter: &str) -> usize {
    letter
        .bytes()
        .fold(0, |column, byte| column * 26 + (byte - b'A' + 1) as usize)
}

/// 1 起始的列号 → 列字母（1 → "A", 27 → "AA"）
pub fn index_to_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let remainder = (column - 1) % 26;
        letters.push(b'A' + remainder as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 0 起始的数组下标 → 列字母
pub fn offset_to_letter(offset: usize) -> String {
    index_to_letter(offset + 1)
}

/// 列字母 → 0 起始的数组下标
pub fn letter_to_offset(letter: &str) -> usize {
    letter_to_index(letter).saturating_sub(1)
}

/// 是否是合法的列字母
pub fn is_column_letter(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Z]{1,3}$").expect("Hardcode regex pattern"))
        .is_match(value)
}

/// 单元格地址（列字母 + 1 起始行号），例如 `CF12`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub column: String,
    pub row: u32,
}

impl CellAddress {
    pub fn new(column: impl Into<String>, row: u32) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }

    /// 带工作表名的 A1 引用，例如 `'修正用シート'!CF12`
    pub fn qualified(&self, sheet_name: &str) -> String {
        format!("{}!{}", quote_sheet_name(sheet_name), self)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// 工作表名加单引号（名称中的单引号需要重复转义）
pub fn quote_sheet_name(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_to_index() {
        assert_eq!(letter_to_index("A"), 1);
        assert_eq!(letter_to_index("Z"), 26);
        assert_eq!(letter_to_index("AA"), 27);
        assert_eq!(letter_to_index("AW"), 49);
        assert_eq!(letter_to_index("CF"), 84);
        assert_eq!(letter_to_index("CJ"), 88);
    }

    #[test]
    fn test_index_to_letter() {
        assert_eq!(index_to_letter(1), "A");
        assert_eq!(index_to_letter(26), "Z");
        assert_eq!(index_to_letter(27), "AA");
        assert_eq!(index_to_letter(52), "AZ");
        assert_eq!(index_to_letter(703), "AAA");
        assert_eq!(offset_to_letter(83), "CF");
    }

    #[test]
    fn test_letter_offset_matches_layout_convention() {
        // 梱包ステータス列 CF 对应数组下标 83
        assert_eq!(letter_to_offset("CF"), 83);
        assert_eq!(letter_to_offset("CG"), 84);
    }

    #[test]
    fn test_is_column_letter() {
        assert!(is_column_letter("CF"));
        assert!(!is_column_letter("cf"));
        assert!(!is_column_letter(""));
        assert!(!is_column_letter("C1"));
    }

    #[test]
    fn test_cell_address_display() {
        let address = CellAddress::new("CF", 12);
        assert_eq!(address.to_string(), "CF12");
        assert_eq!(address.qualified("修正用シート"), "'修正用シート'!CF12");
        assert_eq!(address.qualified("it's"), "'it''s'!CF12");
    }
}
