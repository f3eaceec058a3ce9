/// Apps Script Web App 写入客户端
///
/// 表格所有者部署的脚本按行接收更新（`action: "updatePacking"`），
/// 状态与时间戳由脚本自己写入，这里只提交保管场所、数量和担当者。
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::CellWriter;
use crate::config::Config;
use crate::error::{AppError, AppResult, CollaboratorError, ConfigError};
use crate::models::{CellWrite, Field, WriteOutcome};

const UPDATE_ACTION: &str = "updatePacking";

/// Apps Script 客户端
#[derive(Debug)]
pub struct GasClient {
    http: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GasUpdateRequest {
    action: &'static str,
    row_index: u32,
    packing_data: GasPackingData,
}

#[derive(Debug, Default, Serialize)]
struct GasPackingData {
    location: String,
    quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GasReply {
    success: bool,
    message: Option<String>,
    error: Option<String>,
}

/// 同一行的写入
#[derive(Debug)]
struct RowUpdate {
    request: GasUpdateRequest,
    addresses: Vec<String>,
}

impl GasClient {
    /// 用 `gas_endpoint` 创建客户端；未配置时返回 `None`
    pub fn from_config(config: &Config) -> AppResult<Option<Self>> {
        match config.gas_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                Self::new(endpoint, config.request_timeout_secs).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn new(endpoint: &str, timeout_secs: u64) -> AppResult<Self> {
        let endpoint = Url::parse(endpoint)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::InvalidBaseUrl(endpoint.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { http, endpoint })
    }

    async fn post(&self, request: &GasUpdateRequest) -> AppResult<()> {
        debug!("GAS 更新第 {} 行", request.row_index);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = gas_reply(self.endpoint.as_str(), status, &body)?;
        if let Some(message) = message {
            debug!("GAS: {}", message);
        }
        Ok(())
    }
}

#[async_trait]
impl CellWriter for GasClient {
    async fn write_cells(&self, writes: &[CellWrite]) -> AppResult<WriteOutcome> {
        let updates = group_by_row(writes)?;

        let mut outcome = WriteOutcome::default();
        for update in updates {
            if let Err(e) = self.post(&update.request).await {
                if outcome.updated_ranges.is_empty() {
                    return Err(e);
                }
                warn!(
                    "GAS 写入部分失败: 请求 {} 个, 已写入 {} 个",
                    writes.len(),
                    outcome.updated_cells
                );
                return Err(CollaboratorError::PartialWrite {
                    requested: writes.len(),
                    applied: outcome.updated_ranges,
                }
                .into());
            }
            outcome.updated_cells += update.addresses.len();
            outcome.updated_ranges.extend(update.addresses);
        }

        Ok(outcome)
    }
}

/// 把单元格写入按行还原为脚本的更新请求（保持首次出现的行顺序）
///
/// 状态与时间戳列由脚本写入，只需确认它们属于同一行。
fn group_by_row(writes: &[CellWrite]) -> Result<Vec<RowUpdate>, CollaboratorError> {
    let mut updates: Vec<(RowUpdate, bool, bool)> = Vec::new();

    for write in writes {
        let row = write.address.row;
        let index = match updates.iter().position(|(u, _, _)| u.request.row_index == row) {
            Some(index) => index,
            None => {
                updates.push((
                    RowUpdate {
                        request: GasUpdateRequest {
                            action: UPDATE_ACTION,
                            row_index: row,
                            packing_data: GasPackingData::default(),
                        },
                        addresses: Vec::new(),
                    },
                    false,
                    false,
                ));
                updates.len() - 1
            }
        };
        let (update, has_location, has_quantity) = &mut updates[index];
        let data = &mut update.request.packing_data;

        match write.field {
            Some(Field::PackingLocation) => {
                data.location = write.value.clone();
                *has_location = true;
            }
            Some(Field::PackingQuantity) => {
                data.quantity = write.value.clone();
                *has_quantity = true;
            }
            Some(Field::PackingUser) => data.user = Some(write.value.clone()),
            Some(Field::PackingStatus) | Some(Field::PackingDate) => {}
            _ => {
                return Err(CollaboratorError::UnsupportedWrite(format!(
                    "{} 不是梱包列",
                    write.address
                )))
            }
        }
        update.addresses.push(write.address.to_string());
    }

    updates
        .into_iter()
        .map(|(update, has_location, has_quantity)| {
            if has_location && has_quantity {
                Ok(update)
            } else {
                Err(CollaboratorError::UnsupportedWrite(format!(
                    "第 {} 行缺少保管场所或数量",
                    update.request.row_index
                )))
            }
        })
        .collect()
}

/// 解析脚本响应：HTTP 错误或 `success: false` 都视为后端错误
fn gas_reply(endpoint: &str, status: StatusCode, body: &str) -> AppResult<Option<String>> {
    if !status.is_success() {
        warn!("GAS 返回错误 ({}): {}", endpoint, status);
        return Err(AppError::bad_response(
            endpoint,
            status.as_u16(),
            format!("HTTP Error: {}", status.as_u16()),
        ));
    }

    let reply: GasReply = serde_json::from_str(body)?;
    if !reply.success {
        let message = reply.error.unwrap_or_else(|| "GAS error".to_string());
        warn!("GAS 更新失败 ({}): {}", endpoint, message);
        return Err(AppError::bad_response(endpoint, status.as_u16(), message));
    }
    Ok(reply.message)
}
