//! 模板兜底：离线、确定性地生成一份可用表单
//!
//! 以内置参考表单为底，只定制首步标题（取 prompt 前 5 个词）与 contact 步骤的副标题。
//! 不做任何网络调用，结果满足全部结构不变量。

use crate::form::model::{
    Choice, ChoiceStep, ContactStep, DropdownStep, FormSpecification, LocationStep, SliderStep,
    Step, StepKind, Submission, TextValidation, TextboxStep, Theme, UiText,
};

/// 首步标题取 prompt 的词数上限
const TITLE_WORDS: usize = 5;

const DEFAULT_FIRST_TITLE: &str = "What can we help you with?";
const DEFAULT_CONTACT_SUBTITLE: &str = "How can we reach you?";

/// 内置参考表单（不带定制）
pub fn reference_specification() -> FormSpecification {
    let steps = vec![
        Step::new(
            "service-type",
            DEFAULT_FIRST_TITLE,
            "Choose the option that best describes your request",
            StepKind::Tiles(ChoiceStep {
                options: vec![
                    Choice::new("new-project", "New project")
                        .with_description("Start something from scratch")
                        .with_icon("star", "🚀"),
                    Choice::new("repair", "Repair or fix")
                        .with_description("Something needs attention")
                        .with_icon("wrench", "🔧"),
                    Choice::new("consultation", "Consultation")
                        .with_description("Get expert advice first")
                        .with_icon("users", "💬"),
                    Choice::new("other", "Other")
                        .with_description("Something else entirely")
                        .with_icon("help-circle", "❓"),
                ],
            }),
        ),
        Step::new(
            "priorities",
            "What matters most to you?",
            "Select all that apply",
            StepKind::MultiSelect(ChoiceStep {
                options: vec![
                    Choice::new("price", "Best price")
                        .with_description("Keep costs low")
                        .with_icon("dollar-sign", "💰"),
                    Choice::new("speed", "Fast turnaround")
                        .with_description("Get it done quickly")
                        .with_icon("clock", "⏱️"),
                    Choice::new("quality", "Top quality")
                        .with_description("Premium results")
                        .with_icon("star", "⭐"),
                    Choice::new("support", "Ongoing support")
                        .with_description("Help after the job is done")
                        .with_icon("shield", "🛡️"),
                ],
            }),
        ),
        Step::new(
            "budget",
            "What is your budget?",
            "Drag the slider to your approximate budget",
            StepKind::Slider(SliderStep {
                min: 0.0,
                max: 10_000.0,
                step: 100.0,
                default_value: 2_500.0,
                prefix: Some("$".to_string()),
                suffix: None,
            }),
        ),
        Step::new(
            "timeline",
            "When would you like to start?",
            "Pick the timeframe that works best",
            StepKind::Dropdown(DropdownStep {
                options: vec![
                    Choice::new("asap", "As soon as possible").with_icon("zap", "⚡"),
                    Choice::new("weeks", "Within a few weeks").with_icon("calendar", "📅"),
                    Choice::new("months", "In a few months").with_icon("calendar", "🗓️"),
                    Choice::new("flexible", "I'm flexible").with_icon("help-circle", "🤷"),
                ],
                placeholder: "Select a timeframe".to_string(),
            }),
        ),
        Step::new(
            "details",
            "Tell us more about your needs",
            "Any details help us prepare the right answer",
            StepKind::Textbox(TextboxStep {
                placeholder: "Describe what you have in mind...".to_string(),
                rows: 4,
                validation: TextValidation {
                    required: false,
                    min_length: 0,
                },
            }),
        ),
        Step::new(
            "location",
            "Where are you located?",
            "We use this to match you with nearby help",
            StepKind::Location(LocationStep::default()),
        ),
        Step::new(
            "contact",
            "How should we contact you?",
            DEFAULT_CONTACT_SUBTITLE,
            StepKind::Contact(ContactStep::default()),
        ),
    ];

    FormSpecification {
        steps,
        ui: UiText::default(),
        submission: Submission::default(),
        theme: Theme::default(),
    }
}

/// 首步标题：prompt 前 5 个词；prompt 更短则用全文；空 prompt 保留默认标题
fn title_from_prompt(prompt: &str) -> Option<String> {
    let words: Vec<&str> = prompt.split_whitespace().take(TITLE_WORDS).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// 按 prompt 定制参考表单
pub fn templated_fallback(prompt: &str) -> FormSpecification {
    let mut spec = reference_specification();
    let Some(short) = title_from_prompt(prompt) else {
        return spec;
    };

    if let Some(first) = spec.steps.first_mut() {
        first.title = short.clone();
    }
    if let Some(contact) = spec
        .steps
        .iter_mut()
        .find(|s| matches!(s.kind, StepKind::Contact(_)))
    {
        contact.subtitle = format!("How can we reach you about \"{short}\"?");
    }
    spec
}
