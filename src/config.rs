/// 程序配置
///
/// 只包含进程级别的运行参数；求职相关的设置见 [`crate::models::Settings`]
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL（职位搜索页）
    pub target_url: String,
    /// 是否启动无头浏览器（否则连接已打开的浏览器）
    pub headless: bool,
    /// 求职设置文件 (TOML)
    pub settings_file: String,
    /// 持久化状态文件 (JSON)
    pub state_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 每次页面操作后等待页面稳定的时间（毫秒）
    pub settle_delay_ms: u64,
    /// 申请弹窗的最大步数
    pub max_steps: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            target_url: "https://www.linkedin.com/jobs/search/".to_string(),
            headless: false,
            settings_file: "settings.toml".to_string(),
            state_file: "auto_apply_state.json".to_string(),
            verbose_logging: false,
            settle_delay_ms: 1000,
            max_steps: 10,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            state_file: std::env::var("STATE_FILE").unwrap_or(default.state_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_ms),
            max_steps: std::env::var("MAX_STEPS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_steps),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
