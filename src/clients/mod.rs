//! 表格后端协作方
//!
//! 核心只通过两个窄接口访问表格：读取一块单元格、批量写入单元格。

pub mod gas_client;
pub mod memory_sheet;
pub mod sheets_client;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{CellWrite, WriteOutcome};
use crate::sheet::RawRow;

pub use gas_client::GasClient;
pub use memory_sheet::MemorySheet;
pub use sheets_client::SheetsClient;

/// 读取协作方
#[async_trait]
pub trait RowReader: Send + Sync {
    /// 读取一个范围内的全部单元格（第 0 行为表头）
    ///
    /// 空表返回空集合，而不是错误。
    async fn read_rows(&self, range: &str) -> AppResult<Vec<RawRow>>;
}

/// 写入协作方
#[async_trait]
pub trait CellWriter: Send + Sync {
    /// 批量写入单元格
    ///
    /// 只写入了一部分时必须返回 `CollaboratorError::PartialWrite` 并列出已写入的地址。
    async fn write_cells(&self, writes: &[CellWrite]) -> AppResult<WriteOutcome>;
}
