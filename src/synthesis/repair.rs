//! JSON 修复代理：直接解析失败时，用一次独立调用把近似 JSON 修成合法 JSON
//!
//! 结果必须能解析，否则视为修复失败；修复只调用一次。

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::llm::{system_and_user, LlmClient, LlmError, SamplingConfig};
use crate::synthesis::extract_json;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("repair request failed: {0}")]
    Request(#[from] LlmError),

    #[error("repaired text still does not parse: {0}")]
    StillInvalid(String),
}

/// JSON 修复代理：持有 LLM、修复规则 prompt 与采样参数
pub struct JsonRepairAgent {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    sampling: SamplingConfig,
}

impl JsonRepairAgent {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>, sampling: SamplingConfig) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            sampling,
        }
    }

    /// 修复 `malformed`，返回解析后的值
    pub async fn repair(&self, malformed: &str) -> Result<Value, RepairError> {
        let messages = system_and_user(self.system_prompt.clone(), malformed);
        let response = self.llm.complete(&messages, &self.sampling).await?;
        let candidate = extract_json(&response);
        serde_json::from_str(candidate).map_err(|e| {
            tracing::debug!("Repair output ({} chars) still invalid", candidate.len());
            RepairError::StillInvalid(e.to_string())
        })
    }
}
