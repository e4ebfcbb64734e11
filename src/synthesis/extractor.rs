//! 从模型回复中抠出 JSON 子串
//!
//! 启发式而非解析器：去掉 Markdown 代码围栏；否则取第一个开括号到最后一个闭括号；
//! 都找不到时原样返回 trim 后的文本（下游解析失败会触发 JSON 修复）。不校验括号配对。

const FENCE: &str = "```";

/// 提取对象（`{ ... }`）
pub fn extract_json(raw: &str) -> &str {
    extract_between(raw, '{', '}')
}

/// 提取数组（`[ ... ]`），供图标 / Emoji 批量调用使用
pub fn extract_json_array(raw: &str) -> &str {
    extract_between(raw, '[', ']')
}

fn extract_between(raw: &str, open: char, close: char) -> &str {
    let trimmed = raw.trim();
    let body = strip_fence(trimmed).unwrap_or(trimmed);

    let Some(start) = body.find(open) else {
        return body;
    };
    match body.rfind(close) {
        Some(end) if end > start => &body[start..=end],
        // 截断输出：没有闭括号，从开括号取到末尾
        _ => &body[start..],
    }
}

/// 取第一个代码围栏内的内容（跳过 ```json 之类的语言标记）；围栏未闭合时取到末尾
fn strip_fence(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let after = &text[start + FENCE.len()..];
    let content = match after.find('\n') {
        Some(nl) if !after[..nl].trim_start().starts_with(['{', '[']) => &after[nl + 1..],
        _ => after,
    };
    let inner = match content.find(FENCE) {
        Some(end) => &content[..end],
        None => content,
    };
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        assert_eq!(extract_json(r#"  {"a": 1}  "#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_fenced_with_language() {
        let raw = "Here you go:\n```json\n{\"steps\": []}\n```\nEnjoy!";
        assert_eq!(extract_json(raw), "{\"steps\": []}");
    }

    #[test]
    fn test_fenced_without_language() {
        let raw = "```\n{\"x\": true}\n```";
        assert_eq!(extract_json(raw), "{\"x\": true}");
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Sure! {\"a\": {\"b\": 2}} Let me know if you need more.";
        assert_eq!(extract_json(raw), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_truncated_output_kept_from_brace() {
        let raw = "```json\n{\"steps\": [{\"title\": \"Q";
        assert_eq!(extract_json(raw), "{\"steps\": [{\"title\": \"Q");
    }

    #[test]
    fn test_no_braces_returns_trimmed() {
        assert_eq!(extract_json("  sorry, I cannot do that \n"), "sorry, I cannot do that");
    }

    #[test]
    fn test_array_extraction() {
        let raw = "Icons:\n```json\n[\"home\", \"car\"]\n```";
        assert_eq!(extract_json_array(raw), "[\"home\", \"car\"]");
        assert_eq!(extract_json_array("[\"a\"] trailing"), "[\"a\"]");
    }
}
