//! 内存表格
//!
//! 不依赖网络的读写协作方，用于测试和离线演示。

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clients::{CellWriter, RowReader};
use crate::error::{AppResult, CollaboratorError, ConfigError};
use crate::models::{CellWrite, WriteOutcome};
use crate::sheet::column::letter_to_offset;
use crate::sheet::{RawRow, Range};

/// 内存表格（第 0 行为表头）
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: RwLock<Vec<RawRow>>,
    fail_after: Option<usize>,
}

impl MemorySheet {
    /// 用给定的单元格内容创建表格
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
            fail_after: None,
        }
    }

    /// 每次批量写入只应用前 `n` 个单元格，之后返回部分写入错误
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// 当前内容快照
    pub async fn rows(&self) -> Vec<RawRow> {
        self.rows.read().await.clone()
    }

    /// 读取单个单元格（1 起始行号），越界时返回空字符串
    pub async fn cell(&self, column: &str, row: u32) -> String {
        let rows = self.rows.read().await;
        (row as usize)
            .checked_sub(1)
            .and_then(|r| rows.get(r))
            .and_then(|cells| cells.get(letter_to_offset(column)))
            .cloned()
            .unwrap_or_default()
    }
}

/// 去掉行尾的空单元格和末尾的空行，与表格 API 的返回形状一致
fn trim_trailing_blanks(mut rows: Vec<RawRow>) -> Vec<RawRow> {
    for row in rows.iter_mut() {
        while row.last().is_some_and(|cell| cell.is_empty()) {
            row.pop();
        }
    }
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    rows
}

#[async_trait]
impl RowReader for MemorySheet {
    async fn read_rows(&self, range: &str) -> AppResult<Vec<RawRow>> {
        let bounds = Range::try_from(range).map_err(ConfigError::from)?;

        let rows = self.rows.read().await;
        let selected: Vec<RawRow> = rows
            .iter()
            .enumerate()
            .filter(|(index, _)| bounds.contains_row(*index))
            .map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(col, _)| bounds.contains_col(*col))
                    .map(|(_, cell)| cell.clone())
                    .collect()
            })
            .collect();

        Ok(trim_trailing_blanks(selected))
    }
}

#[async_trait]
impl CellWriter for MemorySheet {
    async fn write_cells(&self, writes: &[CellWrite]) -> AppResult<WriteOutcome> {
        let mut rows = self.rows.write().await;
        let limit = self.fail_after.unwrap_or(usize::MAX);
        let mut applied = Vec::new();

        for write in writes.iter().take(limit) {
            let row = (write.address.row as usize).saturating_sub(1);
            let col = letter_to_offset(&write.address.column);

            if rows.len() <= row {
                rows.resize_with(row + 1, Vec::new);
            }
            let cells = &mut rows[row];
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = write.value.clone();
            applied.push(write.address.to_string());
        }

        debug!("内存表格写入 {}/{} 个单元格", applied.len(), writes.len());

        if applied.len() < writes.len() {
            return Err(CollaboratorError::PartialWrite {
                requested: writes.len(),
                applied,
            }
            .into());
        }

        Ok(WriteOutcome {
            updated_cells: applied.len(),
            updated_ranges: applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::sheet::CellAddress;

    fn grid() -> Vec<RawRow> {
        vec![
            vec!["h1".into(), "h2".into(), "h3".into()],
            vec!["a".into(), "b".into(), "".into()],
            vec!["".into(), "".into(), "".into()],
        ]
    }

    #[test]
    fn test_read_trims_trailing_blanks() {
        let sheet = MemorySheet::new(grid());
        let rows = tokio_test::block_on(sheet.read_rows("'修正用シート'!A:C")).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["h1".to_string(), "h2".to_string(), "h3".to_string()],
                vec!["a".to_string(), "b".to_string()],
            ]
        );
    }

    #[test]
    fn test_read_header_row_only() {
        let sheet = MemorySheet::new(grid());
        let rows = tokio_test::block_on(sheet.read_rows("1:1")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], "h3");
    }

    #[test]
    fn test_read_empty_sheet() {
        let sheet = MemorySheet::default();
        let rows = tokio_test::block_on(sheet.read_rows("A:CJ")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_write_extends_grid() {
        let sheet = MemorySheet::new(grid());
        let writes = vec![CellWrite::new(CellAddress::new("E", 5), "x")];
        let outcome = tokio_test::block_on(sheet.write_cells(&writes)).unwrap();

        assert_eq!(outcome.updated_cells, 1);
        assert_eq!(outcome.updated_ranges, vec!["E5".to_string()]);
        assert_eq!(tokio_test::block_on(sheet.cell("E", 5)), "x");
        assert_eq!(tokio_test::block_on(sheet.cell("A", 2)), "a");
    }

    #[test]
    fn test_invalid_range_is_config_error() {
        let sheet = MemorySheet::new(grid());
        let err = tokio_test::block_on(sheet.read_rows("A1:B2:C3")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_fail_after_reports_applied_cells() {
        let sheet = MemorySheet::new(grid()).fail_after(1);
        let writes = vec![
            CellWrite::new(CellAddress::new("A", 2), "x"),
            CellWrite::new(CellAddress::new("B", 2), "y"),
        ];
        let err = tokio_test::block_on(sheet.write_cells(&writes)).unwrap_err();

        match err {
            AppError::Collaborator(CollaboratorError::PartialWrite { requested, applied }) => {
                assert_eq!(requested, 2);
                assert_eq!(applied, vec!["A2".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(tokio_test::block_on(sheet.cell("B", 2)), "b");
    }
}
