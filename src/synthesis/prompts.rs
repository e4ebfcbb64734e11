//! 五个调用点的 system prompt
//!
//! 进程启动时加载一次（可由 [prompts].dir 下的同名 txt 覆盖），之后只读共享。
//! `{schema}` 与 `{vocabulary}` 占位符在加载时替换。

use std::path::Path;

use crate::form::{form_schema_json, ICON_VOCABULARY};

pub const SYNTHESIS_ROLE: &str = "You are an expert designer of multi-step questionnaire forms.";
pub const EDIT_ROLE: &str = "You are an expert editor of multi-step questionnaire forms.";
pub const REPAIR_ROLE: &str = "You are a strict JSON repair tool.";
pub const ICON_ROLE: &str = "You assign icon names to answer options.";
pub const EMOJI_ROLE: &str = "You assign emojis to answer options.";

const FORM_RULES: &str = r#"Rules:
1. Output ONLY a single JSON object with a non-empty "steps" array, plus optional "ui", "submission" and "theme" objects. No Markdown, no comments, no prose.
2. Every step has "id", "type", "title" and "subtitle". Every title is unique across the form; every subtitle is unique across the form.
3. "type" is one of: tiles, multiSelect, dropdown, slider, followup, textbox, location, documentUpload, documentInfo, contact.
4. tiles and multiSelect steps have EXACTLY 4 or EXACTLY 6 options. dropdown steps have 3 to 6 options.
5. Each option has "id", "title" and "description". Option titles are unique within their step.
6. slider steps have numeric "min", "max", "step" and "defaultValue" with min < max and defaultValue within range.
7. If a documentUpload step is used, a documentInfo step must come immediately after it.
8. If location and/or contact steps are used, they are the last steps, location first, then contact.
9. Ask 4 to 8 questions that a business would need to qualify this request."#;

const SYNTHESIS_PROMPT: &str = r#"{role}
Turn the user's description into a form specification.

{rules}

JSON Schema of the expected object:
{schema}"#;

const EDIT_PROMPT: &str = r#"{role}
You receive an existing form specification as JSON and an edit instruction. Apply the instruction and return the COMPLETE updated form specification. Keep everything the instruction does not ask to change.

{rules}

JSON Schema of the expected object:
{schema}"#;

const REPAIR_PROMPT: &str = r#"{role}
The user message contains JSON-like text that fails to parse. Return the same content as strictly valid JSON.
- Put double quotes around every key and every string value.
- Remove trailing commas.
- Remove comments.
- Close any unterminated strings, arrays and objects.
- Preserve all content and ordering; do not add, drop or rename fields.
- Output nothing but the JSON."#;

const ICON_PROMPT: &str = r#"{role}
The user message is a JSON array of option titles. Return a JSON array of strings with exactly one icon name per title, in the same order.
Only use names from this list: {vocabulary}
Output nothing but the JSON array."#;

const EMOJI_PROMPT: &str = r#"{role}
The user message is a JSON array of option titles. Return a JSON array of strings with exactly one fitting emoji per title, in the same order.
Each entry is a single emoji character. Output nothing but the JSON array."#;

/// 全部 system prompt（已替换占位符）
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub synthesis: String,
    pub edit: String,
    pub repair: String,
    pub icons: String,
    pub emojis: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptSet {
    /// 内置 prompt
    pub fn builtin() -> Self {
        let [synthesis, edit, repair, icons, emojis] = Self::builtin_templates();
        Self::from_templates(synthesis, edit, repair, icons, emojis)
    }

    /// 优先读 `dir` 下的 synthesis.txt / edit.txt / repair.txt / icons.txt / emojis.txt，缺失的用内置
    pub fn load(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::builtin();
        };
        let builtin = Self::builtin_templates();
        let read = |name: &str, fallback: String| {
            std::fs::read_to_string(dir.join(name))
                .map(|s| {
                    tracing::info!("Loaded prompt override {}", name);
                    s
                })
                .unwrap_or(fallback)
        };
        let [synthesis, edit, repair, icons, emojis] = builtin;
        Self::from_templates(
            read("synthesis.txt", synthesis),
            read("edit.txt", edit),
            read("repair.txt", repair),
            read("icons.txt", icons),
            read("emojis.txt", emojis),
        )
    }

    fn builtin_templates() -> [String; 5] {
        [
            SYNTHESIS_PROMPT.replace("{role}", SYNTHESIS_ROLE),
            EDIT_PROMPT.replace("{role}", EDIT_ROLE),
            REPAIR_PROMPT.replace("{role}", REPAIR_ROLE),
            ICON_PROMPT.replace("{role}", ICON_ROLE),
            EMOJI_PROMPT.replace("{role}", EMOJI_ROLE),
        ]
    }

    fn from_templates(
        synthesis: String,
        edit: String,
        repair: String,
        icons: String,
        emojis: String,
    ) -> Self {
        let schema = form_schema_json();
        let vocabulary = ICON_VOCABULARY.join(", ");
        let fill = |t: String| {
            t.replace("{rules}", FORM_RULES)
                .replace("{schema}", &schema)
                .replace("{vocabulary}", &vocabulary)
        };
        Self {
            synthesis: fill(synthesis),
            edit: fill(edit),
            repair: fill(repair),
            icons: fill(icons),
            emojis: fill(emojis),
        }
    }
}

/// 合成调用的 user 消息
pub fn synthesis_user_message(prompt: &str) -> String {
    format!("Create a form for the following request:\n\n{}", prompt.trim())
}

/// 编辑调用的 user 消息
pub fn edit_user_message(current_json: &str, instruction: &str) -> String {
    format!(
        "Current form specification:\n{}\n\nEdit instruction:\n{}",
        current_json,
        instruction.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_filled() {
        let p = PromptSet::builtin();
        for text in [&p.synthesis, &p.edit, &p.repair, &p.icons, &p.emojis] {
            assert!(!text.contains("{rules}"));
            assert!(!text.contains("{schema}"));
            assert!(!text.contains("{vocabulary}"));
            assert!(!text.contains("{role}"));
        }
        assert!(p.synthesis.starts_with(SYNTHESIS_ROLE));
        assert!(p.synthesis.contains("EXACTLY 4 or EXACTLY 6"));
        assert!(p.icons.contains("map-pin"));
    }

    #[test]
    fn test_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("icons.txt"), "Custom icons: {vocabulary}").unwrap();
        let p = PromptSet::load(Some(dir.path()));
        assert!(p.icons.starts_with("Custom icons: home"));
        assert!(p.repair.starts_with(REPAIR_ROLE));
    }
}
