use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::{ColumnLayout, ResolvedLayout, TextField};
use crate::sheet::column::quote_sheet_name;
use crate::sheet::Range;

/// 默认保管场所候选
pub const DEFAULT_STORAGE_LOCATIONS: [&str; 9] = [
    "仮置きパレット(作業途中)",
    "パレット①",
    "パレット②",
    "パレット③",
    "パレット④",
    "パレット⑤",
    "パレット⑥",
    "パレット⑦",
    "台車(パレットに置き場ないもの)",
];

/// 程序配置
///
/// 进程启动时构造一次，之后显式向下传递；库代码不直接读取环境变量。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 表格后端 ---
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub api_base_url: String,
    /// 只读 API key（只能读取）
    pub api_key: Option<String>,
    /// OAuth access token（写入必需）
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    /// 读取范围，例如 `A:CJ`；缺省时按布局最大列推导
    pub read_range: Option<String>,
    /// Apps Script Web App 地址；设置后梱包更新经由脚本写入
    pub gas_endpoint: Option<String>,

    // --- 提取规则 ---
    pub layout: ColumnLayout,
    /// 状态列等于该值时视为完了
    pub completion_marker: String,
    /// 更新请求未指定担当者时写入的值
    pub default_user: String,
    /// 文本检索作用的字段
    pub search_text_field: TextField,
    /// 制造日早于该日期的行不参与提取（TOML 中请写成字符串 "2025-08-08"）
    pub min_manufacture_date: Option<NaiveDate>,
    /// 固定时区偏移（分钟），缺省使用本机时区
    pub utc_offset_minutes: Option<i32>,
    pub storage_locations: Vec<String>,

    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "修正用シート".to_string(),
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            api_key: None,
            access_token: None,
            request_timeout_secs: 30,
            read_range: None,
            gas_endpoint: None,
            layout: ColumnLayout::default(),
            completion_marker: "完了".to_string(),
            default_user: "system".to_string(),
            search_text_field: TextField::default(),
            min_manufacture_date: None,
            utc_offset_minutes: None,
            storage_locations: DEFAULT_STORAGE_LOCATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量构造（未设置的项使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            spreadsheet_id: env_string("GOOGLE_SHEETS_ID").unwrap_or(default.spreadsheet_id),
            sheet_name: env_string("GOOGLE_SHEETS_NAME").unwrap_or(default.sheet_name),
            api_base_url: env_string("SHEETS_API_BASE_URL").unwrap_or(default.api_base_url),
            api_key: env_string("GOOGLE_API_KEY").or(default.api_key),
            access_token: env_string("GOOGLE_ACCESS_TOKEN").or(default.access_token),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            read_range: env_string("PACKING_READ_RANGE").or(default.read_range),
            gas_endpoint: env_string("GAS_ENDPOINT").or(default.gas_endpoint),
            layout: default.layout,
            completion_marker: env_string("PACKING_COMPLETION_MARKER")
                .unwrap_or(default.completion_marker),
            default_user: env_string("PACKING_DEFAULT_USER").unwrap_or(default.default_user),
            search_text_field: match env_string("PACKING_SEARCH_TEXT_FIELD") {
                Some(value) => parse_text_field(&value)?,
                None => default.search_text_field,
            },
            min_manufacture_date: env_parse("PACKING_MIN_MANUFACTURE_DATE", "date (YYYY-MM-DD)")?
                .or(default.min_manufacture_date),
            utc_offset_minutes: env_parse("PACKING_UTC_OFFSET_MINUTES", "i32")?
                .or(default.utc_offset_minutes),
            storage_locations: env_string("PACKING_STORAGE_LOCATIONS")
                .map(|value| value.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.storage_locations),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(default.verbose_logging),
        })
    }

    /// 启动时校验：时区偏移与列布局
    ///
    /// 按表头定位的布局要等读到表头行后才能完整解析，这里只校验其余部分。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fixed_offset()?;
        if let Some(range) = &self.read_range {
            Range::try_from(range.as_str())?;
        }
        if !self.layout.requires_header() {
            self.layout.resolve(None)?;
        }
        Ok(())
    }

    /// 配置的固定时区偏移
    pub fn fixed_offset(&self) -> Result<Option<FixedOffset>, ConfigError> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(Some)
                .ok_or(ConfigError::InvalidUtcOffset(minutes)),
            None => Ok(None),
        }
    }

    /// 带工作表名的范围，例如 `'修正用シート'!A:CJ`
    pub fn sheet_range(&self, range: &str) -> String {
        format!("{}!{}", quote_sheet_name(&self.sheet_name), range)
    }

    /// 数据读取范围
    pub fn data_range(&self, layout: &ResolvedLayout) -> String {
        let range = self
            .read_range
            .clone()
            .unwrap_or_else(|| layout.covering_range());
        self.sheet_range(&range)
    }

    /// 表头行范围
    pub fn header_range(&self) -> String {
        self.sheet_range("1:1")
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_text_field(value: &str) -> Result<TextField, ConfigError> {
    match value.trim() {
        "seasoning_type" => Ok(TextField::SeasoningType),
        "manufacture_product" => Ok(TextField::ManufactureProduct),
        "fish_type" => Ok(TextField::FishType),
        "origin" => Ok(TextField::Origin),
        other => Err(ConfigError::EnvVarParseFailed {
            var_name: "PACKING_SEARCH_TEXT_FIELD".to_string(),
            value: other.to_string(),
            expected_type: "seasoning_type | manufacture_product | fish_type | origin".to_string(),
        }),
    }
}
