//! DeepSeek API 客户端（OpenAI 兼容格式）
//!
//! - Base URL: https://api.deepseek.com
//! - 模型: deepseek-chat（合成表单用它即可，reasoner 输出 JSON 不稳定）

use crate::llm::OpenAiClient;

/// DeepSeek API 常量
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 DeepSeek 客户端；模型优先取参数，其次 `DEEPSEEK_MODEL` 环境变量，最后 deepseek-chat
pub fn create_deepseek_client(model: Option<&str>, api_key: &str, timeout_secs: u64) -> OpenAiClient {
    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, api_key, timeout_secs)
}
