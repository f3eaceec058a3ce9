//! packing-sheet - 梱包管理表命令行工具
//!
//! 结果以 JSON 输出到 stdout，日志输出到 stderr。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use packing_sheet::models::{load_config, load_layout, Field, UpdateRequest};
use packing_sheet::utils::logging;
use packing_sheet::{
    CellWriter, Config, FilterCriteria, GasClient, PackingFlow, SheetsClient, SystemClock,
    UpdatePayload,
};

#[derive(Parser)]
#[command(
    name = "packing-sheet",
    version,
    about = "工厂梱包管理表：查看、检索、登记梱包完了",
    after_help = "配置：\n  \
                  PACKING_CONFIG=config.toml 指定配置文件，否则读取环境变量\n  \
                  PACKING_LAYOUT_FILE=layout.toml 覆盖列布局\n  \
                  GAS_ENDPOINT=https://script.google.com/... 经由 Apps Script 写入\n\n\
                  示例：\n  \
                  packing-sheet list\n  \
                  packing-sheet search --date 2025/08/08 --status 未処理\n  \
                  packing-sheet update --row 12 --location パレット① --quantity 10"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出 debug 日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 全部记录与统计
    List,

    /// 按条件检索
    Search {
        /// 制造日 (YYYY/MM/DD)
        #[arg(long)]
        date: Option<String>,
        /// 文本（部分一致，不区分大小写）
        #[arg(long)]
        text: Option<String>,
        /// 状态：未処理 / 完了
        #[arg(long)]
        status: Option<String>,
        /// 数量下限
        #[arg(long)]
        min: Option<u64>,
        /// 数量上限
        #[arg(long)]
        max: Option<u64>,
        /// 最多返回条数
        #[arg(long)]
        limit: Option<u64>,
        /// 跳过条数
        #[arg(long)]
        offset: Option<u64>,
    },

    /// 登记梱包完了
    Update {
        /// 行号（1 起始，含表头行）
        #[arg(long, allow_negative_numbers = true)]
        row: i64,
        /// 保管场所
        #[arg(long)]
        location: String,
        /// 保管数量
        #[arg(long)]
        quantity: String,
        /// 担当者
        #[arg(long)]
        user: Option<String>,
        /// 只输出写入计划，不写入
        #[arg(long)]
        dry_run: bool,
    },

    /// 从 JSON 文件批量登记（`[{"rowIndex": 12, "packingData": {...}}]`）
    Batch {
        file: PathBuf,
    },

    /// 保管场所候选
    Locations,

    /// 当前列布局
    Layout,
}

/// 加载配置：配置文件优先，其次环境变量
async fn resolve_config() -> Result<Config> {
    let mut config = match std::env::var("PACKING_CONFIG") {
        Ok(path) if !path.trim().is_empty() => load_config(Path::new(&path)).await?,
        _ => Config::from_env()?,
    };

    if let Ok(path) = std::env::var("PACKING_LAYOUT_FILE") {
        if !path.trim().is_empty() {
            config.layout = load_layout(Path::new(&path)).await?;
        }
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config().await?;
    logging::init(cli.verbose || config.verbose_logging);
    logging::log_startup(&config);

    let client = Arc::new(SheetsClient::new(&config)?);
    // 配置了 GAS 地址时由脚本写入，读取仍走 Sheets API
    let writer: Arc<dyn CellWriter> = match GasClient::from_config(&config)? {
        Some(gas) => Arc::new(gas),
        None => client.clone(),
    };
    let clock = Arc::new(SystemClock::new(config.fixed_offset()?));
    let flow = PackingFlow::new(client, writer, clock, config);

    match cli.command {
        Commands::List => {
            let snapshot = flow.extract_all().await?;
            logging::log_snapshot(&snapshot.stats);
            print_json(&snapshot)?;
        }
        Commands::Search {
            date,
            text,
            status,
            min,
            max,
            limit,
            offset,
        } => {
            let criteria = FilterCriteria {
                date,
                text,
                status,
                quantity_min: min,
                quantity_max: max,
                limit,
                offset,
            };
            let snapshot = flow.search(&criteria).await?;
            logging::log_snapshot(&snapshot.stats);
            print_json(&snapshot)?;
        }
        Commands::Update {
            row,
            location,
            quantity,
            user,
            dry_run,
        } => {
            let mut payload = UpdatePayload::new(location, quantity);
            payload.user = user;
            let request = UpdateRequest::new(row, payload);

            if dry_run {
                print_json(&flow.plan_update(&request).await?)?;
            } else {
                let result = flow.apply_update(&request).await?;
                logging::log_update(&result);
                print_json(&json!({ "success": true, "result": result }))?;
            }
        }
        Commands::Batch { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("读取批量文件失败: {}", file.display()))?;
            let requests: Vec<UpdateRequest> = serde_json::from_str(&content)
                .with_context(|| format!("批量文件格式错误: {}", file.display()))?;

            let report = flow.apply_batch(&requests).await?;
            logging::log_batch(&report);
            print_json(&json!({ "success": report.is_complete(), "report": report }))?;
        }
        Commands::Layout => {
            let layout = flow.resolve_layout().await?;
            let columns: Map<String, Value> = Field::ALL
                .iter()
                .map(|field| (field.name().to_string(), Value::from(layout.letter(*field))))
                .collect();
            print_json(&json!({ "version": layout.version(), "columns": columns }))?;
        }
        Commands::Locations => print_json(&flow.config().storage_locations)?,
    }

    Ok(())
}
