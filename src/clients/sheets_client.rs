/// Google Sheets API 客户端
///
/// 封装 values.get / values.batchUpdate 两个 REST 调用
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::{CellWriter, RowReader};
use crate::config::Config;
use crate::error::{AppError, AppResult, CollaboratorError, ConfigError};
use crate::models::{CellWrite, WriteOutcome};
use crate::sheet::RawRow;

/// 表格 API 客户端
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    sheet_name: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRangeUpdate>,
}

#[derive(Debug, Serialize)]
struct ValueRangeUpdate {
    range: String,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BatchUpdateResponse {
    total_updated_cells: usize,
    responses: Vec<UpdateValuesResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UpdateValuesResponse {
    updated_range: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl SheetsClient {
    /// 创建新的表格客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(config.api_base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidBaseUrl(config.api_base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// 构建 `spreadsheets/{id}/...` 地址（路径段自动转义）
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("spreadsheets")
                .push(&self.spreadsheet_id)
                .extend(segments);
        }
        url
    }

    /// 附加认证信息：有 access token 用 Bearer，否则用 API key
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.access_token, &self.api_key) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(key)) => request.query(&[("key", key)]),
            (None, None) => request,
        }
    }

    /// 检查响应状态，失败时提取后端返回的错误信息
    async fn check(endpoint: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!("表格 API 返回错误 ({}): {} {}", endpoint, status, message);
        Err(AppError::bad_response(endpoint, status.as_u16(), message))
    }

    /// batchUpdate 请求体
    fn batch_update_body(&self, writes: &[CellWrite]) -> BatchUpdateRequest {
        BatchUpdateRequest {
            // 按原样写入，不让表格把 "=..."、数字或日期样式的文本重新解释
            value_input_option: "RAW",
            data: writes
                .iter()
                .map(|write| ValueRangeUpdate {
                    range: write.address.qualified(&self.sheet_name),
                    values: vec![vec![write.value.clone()]],
                })
                .collect(),
        }
    }

    /// 把 API 返回的单元格值统一成字符串
    fn cell_to_string(value: Value) -> String {
        match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            Value::Bool(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl RowReader for SheetsClient {
    async fn read_rows(&self, range: &str) -> AppResult<Vec<RawRow>> {
        let url = self.endpoint(&["values", range]);
        debug!("读取表格范围: {}", range);

        let response = self.authorize(self.http.get(url)).send().await?;
        let response = Self::check(range, response).await?;
        let value_range: ValueRange = serde_json::from_str(&response.text().await?)?;

        let rows: Vec<RawRow> = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(Self::cell_to_string).collect())
            .collect();

        debug!("读取完成: {} 行", rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl CellWriter for SheetsClient {
    async fn write_cells(&self, writes: &[CellWrite]) -> AppResult<WriteOutcome> {
        if self.access_token.is_none() {
            return Err(CollaboratorError::WriteNotPermitted(
                "API key 只能读取，写入需要 access token".to_string(),
            )
            .into());
        }
        if writes.is_empty() {
            return Ok(WriteOutcome::default());
        }

        let body = self.batch_update_body(writes);
        let endpoint = "values:batchUpdate";
        let url = self.endpoint(&[endpoint]);
        debug!("批量写入 {} 个单元格", writes.len());

        let response = self
            .authorize(self.http.post(url))
            .json(&body)
            .send()
            .await?;
        let response = Self::check(endpoint, response).await?;

        write_outcome(writes.len(), &response.text().await?)
    }
}

/// 从错误响应中取出 `{"error": {"message": ...}}`，取不到时使用状态码说明
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

/// 把 batchUpdate 的响应体换算为写入结果
///
/// 实际写入的单元格少于请求数时返回 `PartialWrite`，并列出已写入的范围。
fn write_outcome(requested: usize, body: &str) -> AppResult<WriteOutcome> {
    let result: BatchUpdateResponse = if body.trim().is_empty() {
        BatchUpdateResponse::default()
    } else {
        serde_json::from_str(body)?
    };

    let updated_ranges: Vec<String> = result
        .responses
        .into_iter()
        .map(|r| r.updated_range)
        .filter(|r| !r.is_empty())
        .collect();

    if result.total_updated_cells < requested {
        warn!(
            "批量写入部分失败: 请求 {} 个, 实际写入 {} 个",
            requested, result.total_updated_cells
        );
        return Err(CollaboratorError::PartialWrite {
            requested,
            applied: updated_ranges,
        }
        .into());
    }

    Ok(WriteOutcome {
        updated_cells: result.total_updated_cells,
        updated_ranges,
    })
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不输出凭据
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SheetsClient {
        let config = Config {
            spreadsheet_id: "sheet-123".to_string(),
            ..Config::default()
        };
        SheetsClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_escapes_range() {
        let url = client().endpoint(&["values", "'修正用シート'!A:CJ"]);
        assert!(url
            .as_str()
            .starts_with("https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/"));
        assert!(!url.as_str().contains("修正"));
    }

    #[test]
    fn test_batch_update_endpoint() {
        let url = client().endpoint(&["values:batchUpdate"]);
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values:batchUpdate"
        );
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(SheetsClient::cell_to_string(Value::from("完了")), "完了");
        assert_eq!(SheetsClient::cell_to_string(Value::from(10)), "10");
        assert_eq!(SheetsClient::cell_to_string(Value::Null), "");
        assert_eq!(SheetsClient::cell_to_string(Value::Bool(true)), "TRUE");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            SheetsClient::new(&config).unwrap_err(),
            AppError::Config(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_batch_update_body_writes_raw_values() {
        let writes = vec![
            CellWrite::new(crate::sheet::CellAddress::new("CG", 12), "=SUM(A1:A3)"),
            CellWrite::new(crate::sheet::CellAddress::new("CH", 12), "010"),
        ];
        let body = serde_json::to_value(client().batch_update_body(&writes)).unwrap();

        assert_eq!(body["valueInputOption"], "RAW");
        assert_eq!(body["data"][0]["range"], "'修正用シート'!CG12");
        assert_eq!(body["data"][0]["values"][0][0], "=SUM(A1:A3)");
        assert_eq!(body["data"][1]["values"][0][0], "010");
    }

    #[test]
    fn test_full_write_outcome() {
        let body = r#"{
            "spreadsheetId": "sheet-123",
            "totalUpdatedCells": 2,
            "responses": [
                {"updatedRange": "'修正用シート'!CF12", "updatedCells": 1},
                {"updatedRange": "'修正用シート'!CG12", "updatedCells": 1}
            ]
        }"#;
        let outcome = write_outcome(2, body).unwrap();
        assert_eq!(outcome.updated_cells, 2);
        assert_eq!(
            outcome.updated_ranges,
            vec!["'修正用シート'!CF12".to_string(), "'修正用シート'!CG12".to_string()]
        );
    }

    #[test]
    fn test_partial_write_outcome() {
        let body = r#"{
            "totalUpdatedCells": 1,
            "responses": [{"updatedRange": "'修正用シート'!CF12"}, {}]
        }"#;
        match write_outcome(5, body).unwrap_err() {
            AppError::Collaborator(CollaboratorError::PartialWrite { requested, applied }) => {
                assert_eq!(requested, 5);
                assert_eq!(applied, vec!["'修正用シート'!CF12".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_body_counts_as_nothing_written() {
        assert!(matches!(
            write_outcome(5, "").unwrap_err(),
            AppError::Collaborator(CollaboratorError::PartialWrite { requested: 5, .. })
        ));
        assert!(matches!(
            write_outcome(5, "not json").unwrap_err(),
            AppError::Collaborator(CollaboratorError::JsonParseFailed(_))
        ));
    }

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, body),
            "The caller does not have permission"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
    }

    #[tokio::test]
    async fn test_write_without_token_is_rejected() {
        let writes = vec![CellWrite::new(
            crate::sheet::CellAddress::new("CF", 2),
            "完了",
        )];
        let err = client().write_cells(&writes).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Collaborator(CollaboratorError::WriteNotPermitted(_))
        ));
    }
}
