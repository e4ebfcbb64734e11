//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use deepseek::{create_deepseek_client, DEEPSEEK_BASE_URL, DEEPSEEK_CHAT};
pub use message::{system_and_user, Message, Role};
pub use mock::{MockLlmClient, RecordedCall};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmError, SamplingConfig};

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 根据配置选择 LLM 后端；没有可用凭证时返回 None（编排器据此直接走模板兜底）
pub fn create_llm_from_config(cfg: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    let Some(api_key) = cfg.llm.resolve_api_key() else {
        tracing::warn!("No generation credential configured");
        return None;
    };
    let timeout = cfg.llm.timeouts.request;

    if cfg.llm.provider.eq_ignore_ascii_case("deepseek") {
        let client = create_deepseek_client(cfg.llm.model.as_deref(), &api_key, timeout);
        tracing::info!("Using DeepSeek LLM ({})", client.model());
        Some(Arc::new(client))
    } else {
        let model = cfg
            .llm
            .model
            .clone()
            .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
        tracing::info!("Using OpenAI-compatible LLM ({})", model);
        Some(Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &model,
            &api_key,
            timeout,
        )))
    }
}
