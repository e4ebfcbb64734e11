//! 合成失败原因
//!
//! 只在管线内部流转：每种原因都由兜底链路在本地消化，最终体现为诊断信息，从不抛给调用方。
//! Display 文本即诊断中的固定短语。

use serde::{Serialize, Serializer};
use thiserror::Error;

/// 各级兜底的失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// 没有配置生成服务凭证
    #[error("credential missing")]
    CredentialMissing,

    /// 网络 / HTTP / 超时
    #[error("request failed")]
    RequestFailed { detail: String },

    /// 解析失败且 JSON 修复也失败
    #[error("repair failed")]
    RepairFailed { detail: String },

    /// 合法 JSON 但缺少非空 steps（尚可重试）
    #[error("invalid structure")]
    InvalidStructure { detail: String },

    /// 重试后结构仍无效
    #[error("invalid structure after retry")]
    InvalidStructureAfterRetry { detail: String },
}

impl FailureReason {
    pub fn detail(&self) -> Option<&str> {
        match self {
            FailureReason::CredentialMissing => None,
            FailureReason::RequestFailed { detail }
            | FailureReason::RepairFailed { detail }
            | FailureReason::InvalidStructure { detail }
            | FailureReason::InvalidStructureAfterRetry { detail } => Some(detail),
        }
    }

    /// 结构无效是唯一可以通过重新生成恢复的失败
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureReason::InvalidStructure { .. })
    }

    /// 层级耗尽后的最终原因：结构无效升级为「重试后仍无效」，其余不变
    pub fn exhausted(self) -> Self {
        match self {
            FailureReason::InvalidStructure { detail } => {
                FailureReason::InvalidStructureAfterRetry { detail }
            }
            other => other,
        }
    }
}

/// 诊断里以固定短语序列化
impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
