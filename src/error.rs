use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 决策服务（LLM）错误
    #[error("决策服务错误: {0}")]
    Decision(#[from] DecisionError),
    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 运行已被停止（取消信号，不是故障）
    #[error("运行已停止")]
    Stopped,
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
}

/// 决策服务错误
#[derive(Debug, Error)]
pub enum DecisionError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 分析结果无法解析
    #[error("无法解析职位分析结果: {response}")]
    AnalysisParseFailed { response: String },
}

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 内容解析失败
    #[error("解析失败 ({path}): {message}")]
    ParseFailed { path: String, message: String },
    /// 序列化失败
    #[error("序列化失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 设置文件解析失败
    #[error("设置文件 {path} 解析失败: {source}")]
    SettingsParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 日志过滤器无效
    #[error("无效的日志过滤器 '{value}'")]
    InvalidLogFilter { value: String },
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Decision(DecisionError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }
}

/// 判断一个 anyhow 错误链是否为停止信号
pub fn is_stopped(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<AppError>(), Some(AppError::Stopped)))
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
