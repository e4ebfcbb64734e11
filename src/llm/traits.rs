//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient::complete。
//! 五个调用点（首次合成、降温重试、JSON 修复、图标批量、Emoji 批量）共用同一能力，仅 prompt 与采样参数不同。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// 采样参数：温度与最大输出 token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl SamplingConfig {
    pub fn new(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::new(0.7)
    }
}

/// 传输层错误：上层一律视为「本层失败」，转入下一级兜底
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("empty response")]
    EmptyResponse,
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回首条回复文本
    async fn complete(
        &self,
        messages: &[Message],
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
