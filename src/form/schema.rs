//! 表单规格 JSON Schema 生成（schemars 自动生成）
//!
//! 拼入合成 / 编辑的 system prompt，减少模型输出结构错误。

use schemars::schema_for;

use crate::form::FormSpecification;

/// 返回 FormSpecification 的 JSON Schema 字符串
pub fn form_schema_json() -> String {
    let schema = schema_for!(FormSpecification);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}
