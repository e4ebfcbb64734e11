//! 兜底链路：有序的生成层级 + 失败到下一步动作的映射
//!
//! 层级按「最便宜的安全选项优先」排列：首次生成 → 降温重试；任何不可重试的失败或层级耗尽后，
//! 落到离线模板（永不失败）。每一层最多执行一次。

use serde::Serialize;

use crate::core::FailureReason;

/// 生成层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTier {
    /// 首次生成
    Primary,
    /// 结构无效后降低随机性重试一次
    LowTemperatureRetry,
}

impl GenerationTier {
    /// 依次尝试的层级（模板兜底不在其中，由调用方最后执行）
    pub const CASCADE: [GenerationTier; 2] =
        [GenerationTier::Primary, GenerationTier::LowTemperatureRetry];

    pub fn first() -> Self {
        Self::CASCADE[0]
    }

    pub fn next(self) -> Option<Self> {
        let idx = Self::CASCADE.iter().position(|t| *t == self)?;
        Self::CASCADE.get(idx + 1).copied()
    }
}

/// 恢复引擎给出的下一步
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// 进入下一生成层级
    Retry(GenerationTier),
    /// 放弃生成，使用模板兜底（附最终原因）
    UseTemplate(FailureReason),
}

/// 将失败映射为动作
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// `current` 层失败后的动作：可重试且还有下一层时重试，否则带最终原因走模板
    pub fn handle(&self, failure: FailureReason, current: GenerationTier) -> RecoveryAction {
        if !failure.is_retryable() {
            return RecoveryAction::UseTemplate(failure);
        }
        match current.next() {
            Some(next) => RecoveryAction::Retry(next),
            None => RecoveryAction::UseTemplate(failure.exhausted()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid() -> FailureReason {
        FailureReason::InvalidStructure {
            detail: "no steps".to_string(),
        }
    }

    #[test]
    fn test_cascade_order() {
        assert_eq!(GenerationTier::first(), GenerationTier::Primary);
        assert_eq!(
            GenerationTier::Primary.next(),
            Some(GenerationTier::LowTemperatureRetry)
        );
        assert_eq!(GenerationTier::LowTemperatureRetry.next(), None);
    }

    #[test]
    fn test_invalid_structure_retries_once() {
        let engine = RecoveryEngine::new();
        assert_eq!(
            engine.handle(invalid(), GenerationTier::Primary),
            RecoveryAction::Retry(GenerationTier::LowTemperatureRetry)
        );
        match engine.handle(invalid(), GenerationTier::LowTemperatureRetry) {
            RecoveryAction::UseTemplate(reason) => {
                assert_eq!(reason.to_string(), "invalid structure after retry");
            }
            other => panic!("Expected UseTemplate, got {other:?}"),
        }
    }

    #[test]
    fn test_request_and_repair_failures_go_to_template() {
        let engine = RecoveryEngine::new();
        for failure in [
            FailureReason::RequestFailed {
                detail: "timeout".to_string(),
            },
            FailureReason::RepairFailed {
                detail: "still invalid".to_string(),
            },
            FailureReason::CredentialMissing,
        ] {
            let action = engine.handle(failure.clone(), GenerationTier::Primary);
            assert_eq!(action, RecoveryAction::UseTemplate(failure));
        }
    }
}
