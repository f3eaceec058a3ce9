use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 更新请求校验失败（写入前即返回）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 读写协作方（表格后端）失败
    #[error("协作方错误: {0}")]
    Collaborator(#[from] CollaboratorError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 更新请求校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 行号必须是正整数
    #[error("行号必须为正整数: {0}")]
    InvalidRowIndex(i64),
    /// 保管场所为空
    #[error("保管场所不能为空")]
    EmptyLocation,
    /// 保管数量为空
    #[error("保管数量不能为空")]
    EmptyQuantity,
}

/// 读写协作方错误
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 后端返回错误响应
    #[error("后端返回错误响应 ({endpoint}): status={status}, message={message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
    /// 未配置写入凭据
    #[error("当前凭据不允许写入: {0}")]
    WriteNotPermitted(String),
    /// 后端无法表达的写入（例如按行提交的后端收到未标注字段的单元格）
    #[error("后端不支持该写入: {0}")]
    UnsupportedWrite(String),
    /// 批量写入只成功了一部分
    #[error("批量写入部分失败: 请求 {requested} 个单元格, 已写入 {applied:?}")]
    PartialWrite {
        requested: usize,
        applied: Vec<String>,
    },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 列字母不合法（只接受大写 A-Z）
    #[error("列地址 '{address}' 不合法 (字段: {field})")]
    InvalidColumnLetter { field: String, address: String },
    /// 同一布局中两个字段指向同一列
    #[error("字段 {first} 与 {second} 使用了同一列 (索引 {index})")]
    DuplicateColumn {
        first: String,
        second: String,
        index: usize,
    },
    /// 表头行中找不到指定列名
    #[error("表头中找不到列 '{header}' (字段: {field})")]
    HeaderNotFound { field: String, header: String },
    /// 布局按表头定位，但没有提供表头行
    #[error("布局 {version} 需要表头行才能解析")]
    HeaderRowMissing { version: String },
    /// 读取范围不合法
    #[error("读取范围不合法: {0}")]
    InvalidRange(#[from] crate::sheet::RangeError),
    /// 后端地址不合法
    #[error("后端地址不合法: {0}")]
    InvalidBaseUrl(String),
    /// 时区偏移超出范围
    #[error("时区偏移 {0} 分钟超出范围")]
    InvalidUtcOffset(i32),
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        AppError::Collaborator(CollaboratorError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Collaborator(CollaboratorError::JsonParseFailed(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(ConfigError::FileReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建后端错误响应
    pub fn bad_response(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        AppError::Collaborator(CollaboratorError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Config(ConfigError::FileReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否是校验错误（调用方据此决定返回 400 还是 500）
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
