//! Formwright - 由自然语言描述合成多步骤问卷表单
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 失败原因、兜底链路、合成 / 编辑主控流程
//! - **form**: 表单数据模型、图标词表与关键词映射、参考模板、JSON Schema
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志初始化
//! - **synthesis**: prompt、JSON 提取、结构规整、JSON 修复、选项增强、不变量强制

pub mod config;
pub mod core;
pub mod form;
pub mod llm;
pub mod observability;
pub mod synthesis;

pub use crate::core::{SynthesisDiagnostic, SynthesisOrchestrator, SynthesisOutcome};
pub use crate::form::FormSpecification;
