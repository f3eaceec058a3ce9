//! 业务能力层
//!
//! 纯函数式的核心变换：同步、无状态、不做 I/O。

pub mod coercion;
pub mod filter_engine;
pub mod record_extractor;
pub mod stats_aggregator;
pub mod update_planner;

pub use filter_engine::FilterEngine;
pub use record_extractor::RecordExtractor;
pub use stats_aggregator::aggregate;
pub use update_planner::UpdatePlanner;
