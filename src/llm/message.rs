//! 发往文本生成服务的单条消息
//!
//! 每个调用点只用 system + user 两条消息（system 为规则集，user 为本次输入）。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 拼出 [system, user] 两条消息
pub fn system_and_user(system: impl Into<String>, user: impl Into<String>) -> Vec<Message> {
    vec![Message::system(system), Message::user(user)]
}
