//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `FORMWRIGHT__*` 覆盖（双下划线表示嵌套，如 `FORMWRIGHT__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::SamplingConfig;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub synthesis: SynthesisSection,
    #[serde(default)]
    pub prompts: PromptsSection,
}

/// [llm] 段：后端选择、凭证与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai
    #[serde(default = "default_provider")]
    pub provider: String,
    /// 模型名；未设置时按 provider 取默认
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// 显式凭证；未设置时读 DEEPSEEK_API_KEY / OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            api_key: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

impl LlmSection {
    /// 解析凭证：配置 > DEEPSEEK_API_KEY（仅 deepseek）> OPENAI_API_KEY；空白值视为未配置，继续找下一个来源
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// 同上，环境变量由 `env` 提供
    pub fn resolve_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        let present = |key: Option<String>| key.filter(|k| !k.trim().is_empty());
        present(self.api_key.clone())
            .or_else(|| {
                if self.provider.eq_ignore_ascii_case("deepseek") {
                    present(env("DEEPSEEK_API_KEY"))
                } else {
                    None
                }
            })
            .or_else(|| present(env("OPENAI_API_KEY")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [synthesis] 段：各调用点的采样参数
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisSection {
    /// 首次合成温度
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// 结构无效后重试的温度（降低随机性）
    #[serde(default = "default_retry_temperature")]
    pub retry_temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub repair_temperature: f32,
    /// 图标 / Emoji 批量调用
    #[serde(default = "default_augment_temperature")]
    pub augment_temperature: f32,
    #[serde(default = "default_augment_max_tokens")]
    pub augment_max_tokens: u32,
}

impl Default for SynthesisSection {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            retry_temperature: default_retry_temperature(),
            max_tokens: default_max_tokens(),
            repair_temperature: 0.0,
            augment_temperature: default_augment_temperature(),
            augment_max_tokens: default_augment_max_tokens(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_retry_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_augment_temperature() -> f32 {
    0.3
}

fn default_augment_max_tokens() -> u32 {
    1024
}

impl SynthesisSection {
    pub fn primary_sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.temperature).with_max_tokens(self.max_tokens)
    }

    pub fn retry_sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.retry_temperature).with_max_tokens(self.max_tokens)
    }

    pub fn repair_sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.repair_temperature).with_max_tokens(self.max_tokens)
    }

    pub fn augment_sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.augment_temperature).with_max_tokens(self.augment_max_tokens)
    }
}

/// [prompts] 段：覆盖内置 prompt 的目录（其中的 synthesis.txt / edit.txt / repair.txt / icons.txt / emojis.txt）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PromptsSection {
    pub dir: Option<PathBuf>,
}

/// 从 config 目录加载配置，环境变量 FORMWRIGHT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 FORMWRIGHT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("FORMWRIGHT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
