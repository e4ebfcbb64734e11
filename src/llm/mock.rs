//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按 system prompt 中的标记匹配预设回复（每个标记一个 FIFO 队列），并记录每次调用，
//! 便于断言兜底链路的调用顺序与采样参数。没有匹配的回复时返回传输错误。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role, SamplingConfig};

/// 一次被记录的调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

struct Rule {
    marker: String,
    replies: VecDeque<Result<String, LlmError>>,
}

/// Mock 客户端：按标记回放脚本
#[derive(Default)]
pub struct MockLlmClient {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// system prompt 含 `marker` 时依次回放 `reply`（同一标记可多次调用，按顺序消费）
    pub fn reply_when(self, marker: &str, reply: impl Into<String>) -> Self {
        self.push(marker, Ok(reply.into()));
        self
    }

    /// system prompt 含 `marker` 时返回错误
    pub fn fail_when(self, marker: &str, error: LlmError) -> Self {
        self.push(marker, Err(error));
        self
    }

    fn push(&self, marker: &str, reply: Result<String, LlmError>) {
        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        match rules.iter_mut().find(|r| r.marker == marker) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                marker: marker.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    /// 已记录的全部调用（按发生顺序）
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// system prompt 含 `marker` 的调用次数
    pub fn call_count(&self, marker: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.system.contains(marker))
            .count()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError> {
        let find = |role: Role| {
            messages
                .iter()
                .find(|m| m.role == role)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        };
        let system = find(Role::System);
        let user = find(Role::User);

        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                system: system.clone(),
                user,
                temperature: sampling.temperature,
            });

        let mut rules = self.rules.lock().unwrap_or_else(|e| e.into_inner());
        rules
            .iter_mut()
            .find(|r| system.contains(&r.marker) && !r.replies.is_empty())
            .and_then(|r| r.replies.pop_front())
            .unwrap_or_else(|| Err(LlmError::Transport("mock: no scripted reply".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::system_and_user;

    #[tokio::test]
    async fn test_replies_in_order_per_marker() {
        let mock = MockLlmClient::new()
            .reply_when("ALPHA", "first")
            .reply_when("ALPHA", "second");
        let msgs = system_and_user("ALPHA rules", "hi");
        let sampling = SamplingConfig::default();
        assert_eq!(mock.complete(&msgs, &sampling).await.unwrap(), "first");
        assert_eq!(mock.complete(&msgs, &sampling).await.unwrap(), "second");
        assert!(mock.complete(&msgs, &sampling).await.is_err());
        assert_eq!(mock.call_count("ALPHA"), 3);
    }

    #[tokio::test]
    async fn test_unmatched_marker_is_transport_error() {
        let mock = MockLlmClient::new().reply_when("ALPHA", "x");
        let msgs = system_and_user("BETA rules", "hi");
        let err = mock
            .complete(&msgs, &SamplingConfig::new(0.1))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
        assert_eq!(mock.calls()[0].temperature, 0.1);
    }
}
