//! 表格寻址：列字母、单元格地址与范围

pub mod column;
pub mod range;

pub use column::{index_to_letter, letter_to_index, CellAddress};
pub use range::{Range, RangeError};

/// 一行原始单元格值（0 起始下标）
pub type RawRow = Vec<String>;
