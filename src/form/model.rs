//! 表单规格的强类型模型
//!
//! Step 为封闭的 tagged enum（按 `"type"` 区分十种步骤），每种步骤的 payload 是独立的记录类型。
//! 上游文本不会直接反序列化成这些类型：先经 normalizer 在 serde_json::Value 上做形状迁移，再逐步转换。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 表单规格（合成管线的最终产物）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormSpecification {
    pub steps: Vec<Step>,
    #[serde(default)]
    pub ui: UiText,
    #[serde(default)]
    pub submission: Submission,
    #[serde(default)]
    pub theme: Theme,
}

impl FormSpecification {
    /// 按阅读顺序遍历所有带选项步骤的选项
    pub fn choices(&self) -> impl Iterator<Item = &Choice> {
        self.steps.iter().flat_map(|s| s.kind.options().iter())
    }

    pub fn choices_mut(&mut self) -> impl Iterator<Item = &mut Choice> {
        self.steps
            .iter_mut()
            .flat_map(|s| s.kind.options_mut().map(|o| o.iter_mut()).into_iter().flatten())
    }
}

/// 单个步骤：公共字段 + 类型相关 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        kind: StepKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            kind,
        }
    }

    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }
}

/// 步骤类型标签（不带 payload，便于比较与排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    Tiles,
    MultiSelect,
    Dropdown,
    Slider,
    Followup,
    Textbox,
    Location,
    DocumentUpload,
    DocumentInfo,
    Contact,
}

impl StepType {
    pub const ALL: [StepType; 10] = [
        StepType::Tiles,
        StepType::MultiSelect,
        StepType::Dropdown,
        StepType::Slider,
        StepType::Followup,
        StepType::Textbox,
        StepType::Location,
        StepType::DocumentUpload,
        StepType::DocumentInfo,
        StepType::Contact,
    ];

    /// 线上 `"type"` 字段的取值
    pub fn as_str(self) -> &'static str {
        match self {
            StepType::Tiles => "tiles",
            StepType::MultiSelect => "multiSelect",
            StepType::Dropdown => "dropdown",
            StepType::Slider => "slider",
            StepType::Followup => "followup",
            StepType::Textbox => "textbox",
            StepType::Location => "location",
            StepType::DocumentUpload => "documentUpload",
            StepType::DocumentInfo => "documentInfo",
            StepType::Contact => "contact",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// 选项数量须为 4 或 6 的步骤
    pub fn is_tile_like(self) -> bool {
        matches!(self, StepType::Tiles | StepType::MultiSelect)
    }
}

/// 十种步骤的 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepKind {
    Tiles(ChoiceStep),
    MultiSelect(ChoiceStep),
    Dropdown(DropdownStep),
    Slider(SliderStep),
    Followup(FollowupStep),
    Textbox(TextboxStep),
    Location(LocationStep),
    DocumentUpload(DocumentUploadStep),
    DocumentInfo(DocumentInfoStep),
    Contact(ContactStep),
}

impl StepKind {
    pub fn step_type(&self) -> StepType {
        match self {
            StepKind::Tiles(_) => StepType::Tiles,
            StepKind::MultiSelect(_) => StepType::MultiSelect,
            StepKind::Dropdown(_) => StepType::Dropdown,
            StepKind::Slider(_) => StepType::Slider,
            StepKind::Followup(_) => StepType::Followup,
            StepKind::Textbox(_) => StepType::Textbox,
            StepKind::Location(_) => StepType::Location,
            StepKind::DocumentUpload(_) => StepType::DocumentUpload,
            StepKind::DocumentInfo(_) => StepType::DocumentInfo,
            StepKind::Contact(_) => StepType::Contact,
        }
    }

    pub fn options(&self) -> &[Choice] {
        match self {
            StepKind::Tiles(s) | StepKind::MultiSelect(s) => &s.options,
            StepKind::Dropdown(s) => &s.options,
            _ => &[],
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<Choice>> {
        match self {
            StepKind::Tiles(s) | StepKind::MultiSelect(s) => Some(&mut s.options),
            StepKind::Dropdown(s) => Some(&mut s.options),
            _ => None,
        }
    }
}

/// 可选项（tiles / multiSelect / dropdown 共用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 图标名，取自固定词表
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub emoji: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>, emoji: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.emoji = emoji.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceStep {
    pub options: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DropdownStep {
    pub options: Vec<Choice>,
    pub placeholder: String,
}

impl Default for DropdownStep {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            placeholder: "Select an option".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SliderStep {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Default for SliderStep {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            default_value: 50.0,
            prefix: None,
            suffix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowupStep {
    pub placeholder: String,
    pub rows: u32,
}

impl Default for FollowupStep {
    fn default() -> Self {
        Self {
            placeholder: "Tell us more...".to_string(),
            rows: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TextboxStep {
    pub placeholder: String,
    pub rows: u32,
    pub validation: TextValidation,
}

impl Default for TextboxStep {
    fn default() -> Self {
        Self {
            placeholder: "Type your answer here...".to_string(),
            rows: 4,
            validation: TextValidation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TextValidation {
    pub required: bool,
    pub min_length: u32,
}

impl Default for TextValidation {
    fn default() -> Self {
        Self {
            required: true,
            min_length: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RequiredValidation {
    pub required: bool,
}

impl Default for RequiredValidation {
    fn default() -> Self {
        Self { required: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationStep {
    pub config: LocationConfig,
    pub validation: RequiredValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationConfig {
    pub labels: LocationLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationLabels {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Default for LocationLabels {
    fn default() -> Self {
        Self {
            address: "Street address".to_string(),
            city: "City".to_string(),
            state: "State".to_string(),
            zip: "ZIP code".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentUploadStep {
    pub config: DocumentUploadConfig,
    /// 约定为可跳过：required 恒为 false
    pub validation: RequiredValidation,
}

impl Default for DocumentUploadStep {
    fn default() -> Self {
        Self {
            config: DocumentUploadConfig::default(),
            validation: RequiredValidation { required: false },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentUploadConfig {
    pub accepted_types: Vec<String>,
    /// 字节
    pub max_file_size: u64,
    pub labels: DocumentUploadLabels,
}

impl Default for DocumentUploadConfig {
    fn default() -> Self {
        Self {
            accepted_types: [".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 10 * 1024 * 1024,
            labels: DocumentUploadLabels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentUploadLabels {
    pub title: String,
    pub drag_drop: String,
    pub browse: String,
    pub skip: String,
}

impl Default for DocumentUploadLabels {
    fn default() -> Self {
        Self {
            title: "Upload a document".to_string(),
            drag_drop: "Drag and drop your file here".to_string(),
            browse: "Browse files".to_string(),
            skip: "Skip this step".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentInfoStep {
    pub config: DocumentInfoConfig,
}

/// documentInfo 仅做展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentInfoConfig {
    pub heading: String,
    pub description: String,
    pub items: Vec<String>,
}

impl Default for DocumentInfoConfig {
    fn default() -> Self {
        Self {
            heading: "We've received your document".to_string(),
            description: "We'll review it alongside your answers.".to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactStep {
    pub config: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactConfig {
    pub labels: ContactFields,
    pub placeholders: ContactFields,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            labels: ContactFields::default_labels(),
            placeholders: ContactFields::default_placeholders(),
        }
    }
}

/// 联系方式四个字段（labels 与 placeholders 共用同一形状）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactFields {
    pub fn default_labels() -> Self {
        Self {
            first_name: "First name".to_string(),
            last_name: "Last name".to_string(),
            email: "Email".to_string(),
            phone: "Phone".to_string(),
        }
    }

    pub fn default_placeholders() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "(555) 123-4567".to_string(),
        }
    }
}

/// 按钮与提示文案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UiText {
    pub next_button: String,
    pub back_button: String,
    pub submit_button: String,
    pub skip_button: String,
    pub required_message: String,
    pub loading_message: String,
    pub error_message: String,
    pub progress_label: String,
}

impl Default for UiText {
    fn default() -> Self {
        Self {
            next_button: "Next".to_string(),
            back_button: "Back".to_string(),
            submit_button: "Submit".to_string(),
            skip_button: "Skip".to_string(),
            required_message: "This field is required".to_string(),
            loading_message: "Submitting...".to_string(),
            error_message: "Something went wrong. Please try again.".to_string(),
            progress_label: "Step {current} of {total}".to_string(),
        }
    }
}

/// 提交后的确认页
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            title: "Thank you!".to_string(),
            message: "We've received your answers and will be in touch shortly.".to_string(),
            button_text: "Done".to_string(),
        }
    }
}

/// 颜色 token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: "#2563eb".to_string(),
            secondary: "#64748b".to_string(),
            accent: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
            text: "#0f172a".to_string(),
        }
    }
}
