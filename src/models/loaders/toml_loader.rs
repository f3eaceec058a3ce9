use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::layout::ColumnLayout;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 读取并解析 TOML 文件
async fn load_toml<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    toml::from_str(&content).map_err(|e| {
        AppError::Config(ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })
    })
}

/// 从 TOML 文件加载程序配置
pub async fn load_config(path: &Path) -> AppResult<Config> {
    let config: Config = load_toml(path).await?;
    tracing::info!(
        "已加载配置: {} (布局 {})",
        path.display(),
        config.layout.version
    );
    Ok(config)
}

/// 从单独的 TOML 文件加载列布局
///
/// 文件内容与 `Config` 中 `[layout]` 表的格式相同，只是不带表头。
pub async fn load_layout(path: &Path) -> AppResult<ColumnLayout> {
    let layout: ColumnLayout = load_toml(path).await?;
    tracing::info!("已加载列布局: {} ({})", layout.version, path.display());
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::ColumnAddress;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("packing_sheet_{}_{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_load_layout_file() {
        let path = temp_path("layout.toml");
        tokio::fs::write(&path, "version = \"narrow\"\npacking_status = 34\n")
            .await
            .unwrap();

        let layout = load_layout(&path).await.unwrap();
        assert_eq!(layout.version, "narrow");
        assert_eq!(layout.packing_status, ColumnAddress::Index(34));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_load_config_reports_path_on_parse_error() {
        let path = temp_path("broken.toml");
        tokio::fs::write(&path, "sheet_name = [").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        match err {
            AppError::Config(ConfigError::TomlParseFailed { path: reported, .. }) => {
                assert_eq!(reported, path.display().to_string());
            }
            other => panic!("unexpected error: {other}"),
        }

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/packing.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::FileReadFailed { .. })
        ));
    }
}
