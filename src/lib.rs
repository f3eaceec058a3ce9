//! # Packing Sheet
//!
//! 工厂梱包管理表的核心逻辑：读取生产登记表、统计梱包状态、检索记录、登记梱包完了
//!
//! ## 架构设计
//!
//! ### ① 表格寻址（Sheet）
//! - `sheet/` - 列字母与 0 起始下标互转、单元格地址、范围解析
//!
//! ### ② 模型层（Models）
//! - `models/` - 列布局、记录、统计、检索条件、写入计划
//! - `ColumnLayout` - 字段到列的映射，可按列字母或表头名定位，带版本号
//!
//! ### ③ 业务能力层（Services）
//! - `RecordExtractor` - 原始行 → `PackingRecord`
//! - `aggregate` - 状态统计（含今日完了数）
//! - `FilterEngine` - AND 条件检索 + 分页
//! - `UpdatePlanner` - 梱包完了 → 5 个单元格写入
//!
//! ### ④ 协作方（Clients / Infrastructure）
//! - `RowReader` / `CellWriter` - 表格读写接口
//! - `SheetsClient` - Google Sheets REST 实现
//! - `GasClient` - Apps Script Web App 写入实现（按行提交）
//! - `MemorySheet` - 内存实现
//! - `Clock` - 当前时间来源
//!
//! ### ⑤ 流程层（Workflow）
//! - `PackingFlow` - 组装以上各层，对外提供 extract_all / search / apply_update

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod sheet;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CellWriter, GasClient, MemorySheet, RowReader, SheetsClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Clock, FixedClock, SystemClock};
pub use models::{
    ColumnLayout, FilterCriteria, PackingRecord, PackingSnapshot, PackingStats, PackingStatus,
    UpdatePayload, UpdateRequest, UpdateResult,
};
pub use workflow::PackingFlow;
