//! 合成编排器：主控流程
//!
//! 负责：按兜底链路驱动生成（首次生成 → JSON 修复 → 降温重试 → 模板），规整与强类型转换、
//! 终止步骤重排、选项增强，最后强制全部不变量。任何失败都在本地消化，
//! 调用方总能拿到一份合法表单和一份说明发生了什么的诊断。

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::{AppConfig, SynthesisSection};
use crate::core::{FailureReason, GenerationTier, RecoveryAction, RecoveryEngine};
use crate::form::{templated_fallback, FormSpecification};
use crate::llm::{create_llm_from_config, system_and_user, LlmClient, SamplingConfig};
use crate::synthesis::prompts::{edit_user_message, synthesis_user_message};
use crate::synthesis::{
    enforce, extract_json, has_steps, into_specification, reorder_terminal_steps,
    AugmentationReport, JsonRepairAgent, NormalizedForm, OptionAugmenter, PromptSet,
};

/// 编辑时从原表单继承的顶层段（生成结果缺失时补回）
const CARRIED_SECTIONS: [&str; 3] = ["ui", "submission", "theme"];

/// 最终表单来自哪条路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisOutcome {
    /// 首次生成即成功
    Generated,
    /// 降温重试后成功
    Retried,
    /// 使用了离线模板
    Template,
    /// 编辑失败，保留原表单
    Unchanged,
}

/// 一次合成 / 编辑的诊断信息
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisDiagnostic {
    pub outcome: SynthesisOutcome,
    /// 兜底原因（成功生成时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FailureReason>,
    /// 原因的补充说明（错误文本等）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 是否经过 JSON 修复
    pub json_repaired: bool,
    /// 发出的生成请求数（不含修复与增强）
    pub attempts: u8,
    /// 规整后仍无法转换而被丢弃的步骤数
    pub dropped_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub augmentation: Option<AugmentationReport>,
}

impl SynthesisDiagnostic {
    fn fallback(outcome: SynthesisOutcome, reason: FailureReason, attempts: u8) -> Self {
        Self {
            outcome,
            detail: reason.detail().map(str::to_string),
            fallback_reason: Some(reason),
            json_repaired: false,
            attempts,
            dropped_steps: 0,
            augmentation: None,
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// 一次生成请求的内容：system / user 消息，以及编辑时需要继承的原表单
struct GenerationRequest {
    system: String,
    user: String,
    carry_over: Option<Value>,
}

/// 兜底链路中成功的一层
struct Generated {
    form: NormalizedForm,
    tier: GenerationTier,
    attempts: u8,
    json_repaired: bool,
}

/// 兜底链路耗尽
struct CascadeFailure {
    reason: FailureReason,
    attempts: u8,
}

/// 合成编排器
pub struct SynthesisOrchestrator {
    llm: Option<Arc<dyn LlmClient>>,
    prompts: Arc<PromptSet>,
    settings: SynthesisSection,
    recovery: RecoveryEngine,
}

impl SynthesisOrchestrator {
    /// `llm` 为 None 表示没有凭证，所有请求直接走模板
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        prompts: Arc<PromptSet>,
        settings: SynthesisSection,
    ) -> Self {
        Self {
            llm,
            prompts,
            settings,
            recovery: RecoveryEngine::new(),
        }
    }

    /// 按配置创建：LLM 后端、prompt 覆盖目录、采样参数
    pub fn from_config(cfg: &AppConfig) -> Self {
        let prompts = PromptSet::load(cfg.prompts.dir.as_deref());
        Self::new(
            create_llm_from_config(cfg),
            Arc::new(prompts),
            cfg.synthesis.clone(),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.llm.is_some()
    }

    /// 由自然语言描述合成表单。永不失败：生成链路耗尽时返回按描述定制的模板。
    pub async fn synthesize(&self, prompt: &str) -> (FormSpecification, SynthesisDiagnostic) {
        let Some(llm) = &self.llm else {
            return self.template(prompt, FailureReason::CredentialMissing, 0);
        };

        tracing::info!("Synthesizing form ({} chars of prompt)", prompt.len());
        let request = GenerationRequest {
            system: self.prompts.synthesis.clone(),
            user: synthesis_user_message(prompt),
            carry_over: None,
        };

        match self.run_cascade(llm, &request).await {
            Ok(generated) => self.finish(llm, generated, false).await,
            Err(failure) => self.template(prompt, failure.reason, failure.attempts),
        }
    }

    /// 按编辑指令修改已有表单。失败时保留原表单（重新强制不变量后返回）。
    pub async fn repair(
        &self,
        original: &FormSpecification,
        instruction: &str,
    ) -> (FormSpecification, SynthesisDiagnostic) {
        let Some(llm) = &self.llm else {
            return self.keep_original(original, FailureReason::CredentialMissing, 0);
        };

        let current = match serde_json::to_value(original) {
            Ok(v) => v,
            Err(e) => {
                let reason = FailureReason::RequestFailed {
                    detail: format!("could not serialize current form: {e}"),
                };
                return self.keep_original(original, reason, 0);
            }
        };
        let current_json = serde_json::to_string_pretty(&current).unwrap_or_default();

        tracing::info!("Editing form with {} steps", original.steps.len());
        let request = GenerationRequest {
            system: self.prompts.edit.clone(),
            user: edit_user_message(&current_json, instruction),
            carry_over: Some(current),
        };

        match self.run_cascade(llm, &request).await {
            Ok(generated) => self.finish(llm, generated, true).await,
            Err(failure) => self.keep_original(original, failure.reason, failure.attempts),
        }
    }

    /// 依次尝试各生成层级，直到成功或恢复引擎要求放弃
    async fn run_cascade(
        &self,
        llm: &Arc<dyn LlmClient>,
        request: &GenerationRequest,
    ) -> Result<Generated, CascadeFailure> {
        let mut tier = GenerationTier::first();
        let mut attempts = 0u8;
        loop {
            attempts += 1;
            match self.attempt(llm, request, tier).await {
                Ok((form, json_repaired)) => {
                    return Ok(Generated {
                        form,
                        tier,
                        attempts,
                        json_repaired,
                    })
                }
                Err(failure) => {
                    tracing::warn!(
                        "Generation tier {:?} failed: {} ({})",
                        tier,
                        failure,
                        failure.detail().unwrap_or("")
                    );
                    match self.recovery.handle(failure, tier) {
                        RecoveryAction::Retry(next) => tier = next,
                        RecoveryAction::UseTemplate(reason) => {
                            return Err(CascadeFailure { reason, attempts })
                        }
                    }
                }
            }
        }
    }

    /// 单层生成：请求 → 提取 → 解析（失败则修复一次）→ 结构检查 → 规整与转换
    async fn attempt(
        &self,
        llm: &Arc<dyn LlmClient>,
        request: &GenerationRequest,
        tier: GenerationTier,
    ) -> Result<(NormalizedForm, bool), FailureReason> {
        let sampling = self.sampling_for(tier);
        let messages = system_and_user(request.system.clone(), request.user.clone());
        let raw = llm
            .complete(&messages, &sampling)
            .await
            .map_err(|e| FailureReason::RequestFailed {
                detail: e.to_string(),
            })?;

        let candidate = extract_json(&raw);
        let (mut value, json_repaired) = match serde_json::from_str::<Value>(candidate) {
            Ok(v) => (v, false),
            Err(parse_err) => {
                tracing::warn!("Generated JSON does not parse ({}), repairing", parse_err);
                let agent = JsonRepairAgent::new(
                    llm.clone(),
                    self.prompts.repair.clone(),
                    self.settings.repair_sampling(),
                );
                let repaired = agent
                    .repair(candidate)
                    .await
                    .map_err(|e| FailureReason::RepairFailed {
                        detail: e.to_string(),
                    })?;
                (repaired, true)
            }
        };

        if !has_steps(&value) {
            return Err(FailureReason::InvalidStructure {
                detail: "missing or empty steps array".to_string(),
            });
        }
        if let Some(original) = &request.carry_over {
            carry_over_sections(&mut value, original);
        }

        let form = into_specification(value);
        if form.spec.steps.is_empty() {
            return Err(FailureReason::InvalidStructure {
                detail: format!("none of {} steps fit the schema", form.dropped_steps),
            });
        }
        Ok((form, json_repaired))
    }

    fn sampling_for(&self, tier: GenerationTier) -> SamplingConfig {
        match tier {
            GenerationTier::Primary => self.settings.primary_sampling(),
            GenerationTier::LowTemperatureRetry => self.settings.retry_sampling(),
        }
    }

    /// 成功生成后的收尾：终止步骤重排 → 选项增强 → 不变量强制
    async fn finish(
        &self,
        llm: &Arc<dyn LlmClient>,
        generated: Generated,
        only_missing: bool,
    ) -> (FormSpecification, SynthesisDiagnostic) {
        let Generated {
            form,
            tier,
            attempts,
            json_repaired,
        } = generated;
        let mut spec = form.spec;
        reorder_terminal_steps(&mut spec.steps);

        let augmenter = OptionAugmenter::new(
            llm.clone(),
            self.prompts.icons.clone(),
            self.prompts.emojis.clone(),
            self.settings.augment_sampling(),
        );
        let (spec, report) = augmenter.augment(spec, only_missing).await;
        let spec = enforce(spec);

        let outcome = match tier {
            GenerationTier::Primary => SynthesisOutcome::Generated,
            GenerationTier::LowTemperatureRetry => SynthesisOutcome::Retried,
        };
        tracing::info!(
            "Form ready: {} steps, {:?} after {} attempt(s)",
            spec.steps.len(),
            outcome,
            attempts
        );
        let (prompt_tokens, completion_tokens, total_tokens) = llm.token_usage();
        tracing::debug!(
            prompt_tokens,
            completion_tokens,
            total_tokens,
            "Cumulative token usage"
        );

        let diagnostic = SynthesisDiagnostic {
            outcome,
            fallback_reason: None,
            detail: None,
            json_repaired,
            attempts,
            dropped_steps: form.dropped_steps,
            augmentation: Some(report),
        };
        (spec, diagnostic)
    }

    /// 模板兜底（不做增强，模板自带图标与 Emoji）
    fn template(
        &self,
        prompt: &str,
        reason: FailureReason,
        attempts: u8,
    ) -> (FormSpecification, SynthesisDiagnostic) {
        tracing::warn!("Using template form: {}", reason);
        let spec = enforce(templated_fallback(prompt));
        let diagnostic = SynthesisDiagnostic::fallback(SynthesisOutcome::Template, reason, attempts);
        (spec, diagnostic)
    }

    fn keep_original(
        &self,
        original: &FormSpecification,
        reason: FailureReason,
        attempts: u8,
    ) -> (FormSpecification, SynthesisDiagnostic) {
        tracing::warn!("Edit not applied, keeping current form: {}", reason);
        let spec = enforce(original.clone());
        let diagnostic =
            SynthesisDiagnostic::fallback(SynthesisOutcome::Unchanged, reason, attempts);
        (spec, diagnostic)
    }
}

/// 生成结果缺少 ui / submission / theme（或不是对象）时从原表单补回
fn carry_over_sections(value: &mut Value, original: &Value) {
    let Some(root) = value.as_object_mut() else {
        return;
    };
    for key in CARRIED_SECTIONS {
        let present = root.get(key).is_some_and(Value::is_object);
        if present {
            continue;
        }
        if let Some(section) = original.get(key) {
            root.insert(key.to_string(), section.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{StepType, DEFAULT_EMOJI};
    use crate::llm::{LlmError, MockLlmClient};
    use crate::synthesis::check_invariants;
    use crate::synthesis::prompts::{EDIT_ROLE, EMOJI_ROLE, ICON_ROLE, REPAIR_ROLE, SYNTHESIS_ROLE};

    const TWO_STEPS: &str = r#"```json
{"steps": [
  {"type": "tiles", "title": "Service", "subtitle": "Pick one",
   "options": ["Cleaning", "Repair", "Install", "Other"]},
  {"type": "contact", "title": "Contact", "subtitle": "How to reach you"}
]}
```"#;

    fn orchestrator(mock: MockLlmClient) -> (Arc<MockLlmClient>, SynthesisOrchestrator) {
        let mock = Arc::new(mock);
        let orch = SynthesisOrchestrator::new(
            Some(mock.clone()),
            Arc::new(PromptSet::builtin()),
            SynthesisSection::default(),
        );
        (mock, orch)
    }

    #[tokio::test]
    async fn test_generated_on_first_tier() {
        let (mock, orch) = orchestrator(
            MockLlmClient::new()
                .reply_when(SYNTHESIS_ROLE, TWO_STEPS)
                .reply_when(ICON_ROLE, r#"["leaf", "wrench", "hammer", "help-circle"]"#)
                .reply_when(EMOJI_ROLE, r#"["🧽", "🔧", "🛠️", "❓"]"#),
        );
        let (spec, diag) = orch.synthesize("I run a home services business").await;

        assert_eq!(diag.outcome, SynthesisOutcome::Generated);
        assert_eq!(diag.attempts, 1);
        assert!(!diag.used_fallback());
        assert_eq!(spec.steps[0].step_type(), StepType::Tiles);
        let icons: Vec<&str> = spec.choices().map(|c| c.icon.as_str()).collect();
        assert_eq!(icons, vec!["leaf", "wrench", "hammer", "help-circle"]);
        assert!(check_invariants(&spec).is_empty());
        assert_eq!(mock.call_count(SYNTHESIS_ROLE), 1);
    }

    #[tokio::test]
    async fn test_no_credential_uses_template() {
        let orch = SynthesisOrchestrator::new(
            None,
            Arc::new(PromptSet::builtin()),
            SynthesisSection::default(),
        );
        let (spec, diag) = orch.synthesize("Dog grooming intake").await;
        assert_eq!(diag.outcome, SynthesisOutcome::Template);
        assert_eq!(
            diag.fallback_reason.map(|r| r.to_string()).as_deref(),
            Some("credential missing")
        );
        assert_eq!(spec.steps[0].title, "Dog grooming intake");
        assert!(check_invariants(&spec).is_empty());
    }

    #[tokio::test]
    async fn test_repair_agent_rescues_malformed_json() {
        let (mock, orch) = orchestrator(
            MockLlmClient::new()
                .reply_when(SYNTHESIS_ROLE, r#"{"steps": [{"type": "textbox", "title": "Notes",}]"#)
                .reply_when(
                    REPAIR_ROLE,
                    r#"{"steps": [{"type": "textbox", "title": "Notes", "subtitle": "Anything else"}]}"#,
                ),
        );
        let (spec, diag) = orch.synthesize("notes form").await;
        assert_eq!(diag.outcome, SynthesisOutcome::Generated);
        assert!(diag.json_repaired);
        assert_eq!(spec.steps[0].title, "Notes");
        assert_eq!(mock.call_count(REPAIR_ROLE), 1);
        // 没有选项时不发增强请求
        assert_eq!(mock.call_count(ICON_ROLE), 0);
    }

    #[tokio::test]
    async fn test_edit_failure_keeps_original() {
        let (_, orch) = orchestrator(
            MockLlmClient::new().fail_when(EDIT_ROLE, LlmError::Transport("503".to_string())),
        );
        let original = templated_fallback("Wedding planning");
        let (spec, diag) = orch.repair(&original, "add a guest count slider").await;
        assert_eq!(diag.outcome, SynthesisOutcome::Unchanged);
        assert_eq!(diag.detail.as_deref(), Some("request failed: 503"));
        assert_eq!(spec, enforce(original));
    }

    #[tokio::test]
    async fn test_edit_carries_sections_and_fills_missing_emoji() {
        let edited = r#"{"steps": [
            {"type": "multiSelect", "title": "Extras", "subtitle": "Pick any",
             "options": [
               {"id": "a", "title": "Flowers", "icon": "star", "emoji": "💐"},
               {"id": "b", "title": "Music", "icon": "star", "emoji": "🎵"},
               {"id": "c", "title": "Photos", "icon": "camera", "emoji": "📷"},
               {"id": "d", "title": "Cake", "icon": "gift"}
             ]}
        ]}"#;
        let (mock, orch) = orchestrator(
            MockLlmClient::new()
                .reply_when(EDIT_ROLE, edited)
                .fail_when(ICON_ROLE, LlmError::Timeout(1))
                .fail_when(EMOJI_ROLE, LlmError::Timeout(1)),
        );
        let mut original = templated_fallback("Wedding planning");
        original.ui.next_button = "Onward".to_string();

        let (spec, diag) = orch.repair(&original, "replace everything with extras").await;
        assert_eq!(diag.outcome, SynthesisOutcome::Generated);
        assert_eq!(spec.ui.next_button, "Onward");
        let emojis: Vec<&str> = spec.choices().map(|c| c.emoji.as_str()).collect();
        assert_eq!(emojis, vec!["💐", "🎵", "📷", DEFAULT_EMOJI]);
        let icon_call = mock
            .calls()
            .into_iter()
            .find(|c| c.system.contains(ICON_ROLE))
            .unwrap();
        assert_eq!(icon_call.user, r#"["Cake"]"#);
    }

    #[test]
    fn test_carry_over_keeps_generated_sections() {
        let mut value = serde_json::json!({"steps": [], "ui": {"nextButton": "Go"}});
        let original = serde_json::json!({"ui": {"nextButton": "Next"}, "theme": {"primary": "#000"}});
        carry_over_sections(&mut value, &original);
        assert_eq!(value["ui"]["nextButton"], "Go");
        assert_eq!(value["theme"]["primary"], "#000");
        assert!(value.get("submission").is_none());
    }
}
