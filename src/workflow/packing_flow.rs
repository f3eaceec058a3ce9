//! 梱包流程 - 流程层
//!
//! 核心职责：把读写协作方、时钟和业务能力组装成对外的三个操作
//!
//! 1. extract_all：读表 → 提取 → 统计
//! 2. search：读表 → 提取 → 筛选 → 统计 → 分页
//! 3. apply_update：校验 → 生成写入计划 → 写入

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::{CellWriter, RowReader};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::Clock;
use crate::models::{
    BatchFailure, BatchReport, CellWrite, FilterCriteria, PackingRecord, PackingSnapshot,
    ResolvedLayout, UpdateRequest, UpdateResult,
};
use crate::services::update_planner::validate;
use crate::services::{aggregate, FilterEngine, RecordExtractor, UpdatePlanner};

/// 梱包流程
///
/// - 不持有表格内容，每次操作都重新读取
/// - 只依赖 `RowReader` / `CellWriter` / `Clock` 三个接口
/// - 写入前完成全部校验，校验失败时不会调用写入方
pub struct PackingFlow {
    reader: Arc<dyn RowReader>,
    writer: Arc<dyn CellWriter>,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl PackingFlow {
    /// 创建新的梱包流程
    pub fn new(
        reader: Arc<dyn RowReader>,
        writer: Arc<dyn CellWriter>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self {
            reader,
            writer,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 解析列布局；按表头定位的布局先读取表头行
    pub async fn resolve_layout(&self) -> AppResult<ResolvedLayout> {
        if !self.config.layout.requires_header() {
            return Ok(self.config.layout.resolve(None)?);
        }

        let rows = self.reader.read_rows(&self.config.header_range()).await?;
        let header = rows.into_iter().next();
        Ok(self.config.layout.resolve(header.as_deref())?)
    }

    /// 读取并提取全部记录（不含统计）
    async fn load_records(&self) -> AppResult<Vec<PackingRecord>> {
        let layout = self.resolve_layout().await?;
        let range = self.config.data_range(&layout);
        let rows = self.reader.read_rows(&range).await?;
        debug!("读取 {} 行 (范围 {}, 布局 {})", rows.len(), range, layout.version());

        let offset = *self.clock.now().offset();
        let extractor = RecordExtractor::new(layout, &self.config.completion_marker, offset)
            .with_min_manufacture_date(self.config.min_manufacture_date);

        Ok(extractor.extract_all(&rows))
    }

    /// 全部记录与统计
    pub async fn extract_all(&self) -> AppResult<PackingSnapshot> {
        let records = self.load_records().await?;
        let stats = aggregate(&records, self.clock.now());

        info!(
            "📦 提取完成: 共 {} 条, 未处理 {}, 完了 {} (今日 {})",
            stats.total, stats.pending, stats.completed, stats.today_completed
        );

        Ok(PackingSnapshot {
            data: records,
            stats,
        })
    }

    /// 按条件检索
    ///
    /// 统计针对筛选后的全部记录；`limit` / `offset` 只影响返回的记录。
    pub async fn search(&self, criteria: &FilterCriteria) -> AppResult<PackingSnapshot> {
        let records = self.load_records().await?;
        let now = self.clock.now();
        let engine = FilterEngine::new(self.config.search_text_field, *now.offset())
            .with_completion_marker(&self.config.completion_marker);

        let snapshot = engine.search(&records, criteria, now);
        info!(
            "🔍 检索完成: 匹配 {} 条, 返回 {} 条",
            snapshot.stats.total,
            snapshot.data.len()
        );
        Ok(snapshot)
    }

    /// 生成写入计划但不执行
    pub async fn plan_update(&self, request: &UpdateRequest) -> AppResult<Vec<CellWrite>> {
        validate(request.row_index, &request.packing_data)?;

        let layout = self.resolve_layout().await?;
        let planner = UpdatePlanner::new(
            &layout,
            &self.config.completion_marker,
            &self.config.default_user,
        );
        Ok(planner.plan(request.row_index, &request.packing_data, self.clock.now())?)
    }

    /// 把一行标记为梱包完了
    ///
    /// # 返回
    /// 校验错误在写入前返回；写入方的错误原样向上传递
    pub async fn apply_update(&self, request: &UpdateRequest) -> AppResult<UpdateResult> {
        let row_index = validate(request.row_index, &request.packing_data)?;
        let writes = self.plan_update(request).await?;

        let outcome = self.writer.write_cells(&writes).await?;
        info!(
            "✓ 第 {} 行已更新: {} 个单元格",
            row_index, outcome.updated_cells
        );

        Ok(UpdateResult {
            row_index,
            writes,
            outcome,
        })
    }

    /// 依次更新多行
    ///
    /// 先为全部请求生成计划，任一请求校验失败则不写入任何行。
    /// 之后按顺序写入，遇到第一个写入失败即停止，报告中保留已完成的部分。
    pub async fn apply_batch(&self, requests: &[UpdateRequest]) -> AppResult<BatchReport> {
        let rows = requests
            .iter()
            .map(|request| validate(request.row_index, &request.packing_data))
            .collect::<Result<Vec<_>, _>>()?;

        let layout = self.resolve_layout().await?;
        let planner = UpdatePlanner::new(
            &layout,
            &self.config.completion_marker,
            &self.config.default_user,
        );
        let now = self.clock.now();
        let plans = requests
            .iter()
            .map(|request| planner.plan(request.row_index, &request.packing_data, now))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = BatchReport::default();
        for (row_index, writes) in rows.into_iter().zip(plans) {
            match self.writer.write_cells(&writes).await {
                Ok(outcome) => report.completed.push(UpdateResult {
                    row_index,
                    writes,
                    outcome,
                }),
                Err(e) => {
                    warn!("⚠️ 第 {} 行写入失败，批量更新中止: {}", row_index, e);
                    report.failed = Some(BatchFailure {
                        row_index,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        info!(
            "批量更新: 完成 {}/{} 行",
            report.completed.len(),
            requests.len()
        );
        Ok(report)
    }
}
