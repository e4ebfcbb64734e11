//! 选项增强：两次独立的批量调用分别为每个选项配图标与 Emoji
//!
//! 两个批量请求并发发出、一起等待。各自在本地校验：图标不在词表内按标题关键词兜底，
//! 数组过短补默认值、过长截断；整次调用失败时返回等长的默认值，不向上抛错。
//! 结果按收集时的展平顺序写回选项。

use std::sync::Arc;

use futures_util::future::join;
use serde::Serialize;
use serde_json::Value;

use crate::form::{
    canonical_icon_name, is_valid_emoji, is_valid_icon, DefaultIconMapper, FormSpecification,
    DEFAULT_EMOJI,
};
use crate::llm::{system_and_user, LlmClient, SamplingConfig};
use crate::synthesis::extract_json_array;

/// 单个批量调用的校验统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// 整次调用失败的原因（此时全部使用默认值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
    /// 被替换的无效条目数
    pub invalid: usize,
    /// 数组过短而补齐的条目数
    pub padded: usize,
    /// 数组过长而截掉的条目数
    pub truncated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AugmentationReport {
    /// 请求增强的选项数
    pub requested: usize,
    pub icons: BatchReport,
    pub emojis: BatchReport,
}

/// 选项增强器
pub struct OptionAugmenter {
    llm: Arc<dyn LlmClient>,
    icon_prompt: String,
    emoji_prompt: String,
    sampling: SamplingConfig,
    mapper: DefaultIconMapper,
}

impl OptionAugmenter {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        icon_prompt: impl Into<String>,
        emoji_prompt: impl Into<String>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            llm,
            icon_prompt: icon_prompt.into(),
            emoji_prompt: emoji_prompt.into(),
            sampling,
            mapper: DefaultIconMapper::new(),
        }
    }

    /// 为表单中的选项配图标与 Emoji。
    /// `only_missing` 为 true 时只处理图标或 Emoji 无效的选项，且只覆盖无效的那一项。
    pub async fn augment(
        &self,
        mut spec: FormSpecification,
        only_missing: bool,
    ) -> (FormSpecification, AugmentationReport) {
        let needs = |icon: &str, emoji: &str| {
            !only_missing || !is_valid_icon(icon) || !is_valid_emoji(emoji)
        };
        let titles: Vec<String> = spec
            .choices()
            .filter(|c| needs(&c.icon, &c.emoji))
            .map(|c| c.title.clone())
            .collect();

        if titles.is_empty() {
            return (spec, AugmentationReport::default());
        }

        let (icons, emojis, report) = self.augment_titles(&titles).await;

        let targets = spec
            .choices_mut()
            .filter(|c| needs(&c.icon, &c.emoji));
        for ((choice, icon), emoji) in targets.zip(icons).zip(emojis) {
            if !only_missing || !is_valid_icon(&choice.icon) {
                choice.icon = icon;
            }
            if !only_missing || !is_valid_emoji(&choice.emoji) {
                choice.emoji = emoji;
            }
        }

        (spec, report)
    }

    /// 对展平后的标题列表并发请求图标与 Emoji，返回与输入等长的两个数组
    pub async fn augment_titles(
        &self,
        titles: &[String],
    ) -> (Vec<String>, Vec<String>, AugmentationReport) {
        let (icon_reply, emoji_reply) = join(
            self.request_batch(&self.icon_prompt, titles),
            self.request_batch(&self.emoji_prompt, titles),
        )
        .await;

        let (icons, icon_report) = fit_batch(
            icon_reply,
            titles,
            |entry, _| {
                let canonical = canonical_icon_name(entry.as_str()?);
                is_valid_icon(&canonical).then_some(canonical)
            },
            |title| self.mapper.icon_for(title).to_string(),
        );

        let (emojis, emoji_report) = fit_batch(
            emoji_reply,
            titles,
            |entry, _| {
                let emoji = entry.as_str()?.trim();
                is_valid_emoji(emoji).then(|| emoji.to_string())
            },
            |_| DEFAULT_EMOJI.to_string(),
        );

        if let Some(reason) = &icon_report.failed {
            tracing::warn!("Icon batch failed, using keyword icons: {}", reason);
        }
        if let Some(reason) = &emoji_report.failed {
            tracing::warn!("Emoji batch failed, using placeholder emoji: {}", reason);
        }

        let report = AugmentationReport {
            requested: titles.len(),
            icons: icon_report,
            emojis: emoji_report,
        };
        (icons, emojis, report)
    }

    /// 发出一次批量请求并解析为 JSON 数组
    async fn request_batch(&self, system: &str, titles: &[String]) -> Result<Vec<Value>, String> {
        let payload = serde_json::to_string(titles).map_err(|e| e.to_string())?;
        let messages = system_and_user(system, payload);
        let response = self
            .llm
            .complete(&messages, &self.sampling)
            .await
            .map_err(|e| e.to_string())?;
        match serde_json::from_str::<Value>(extract_json_array(&response)) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err("response is not a JSON array".to_string()),
            Err(e) => Err(format!("unparsable response: {e}")),
        }
    }
}

/// 把批量回复修整为与 `titles` 等长：逐条校验、补齐、截断；整体失败时全部取兜底
fn fit_batch(
    reply: Result<Vec<Value>, String>,
    titles: &[String],
    validate: impl Fn(&Value, &str) -> Option<String>,
    fallback: impl Fn(&str) -> String,
) -> (Vec<String>, BatchReport) {
    let mut report = BatchReport::default();
    let entries = match reply {
        Ok(entries) => entries,
        Err(reason) => {
            report.failed = Some(reason);
            return (titles.iter().map(|t| fallback(t)).collect(), report);
        }
    };

    report.truncated = entries.len().saturating_sub(titles.len());
    let values = titles
        .iter()
        .enumerate()
        .map(|(i, title)| match entries.get(i) {
            Some(entry) => validate(entry, title).unwrap_or_else(|| {
                report.invalid += 1;
                fallback(title)
            }),
            None => {
                report.padded += 1;
                fallback(title)
            }
        })
        .collect();
    (values, report)
}
