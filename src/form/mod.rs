//! 表单模型层：强类型 Schema、图标词表、模板兜底、JSON Schema 生成

pub mod icons;
pub mod model;
pub mod schema;
pub mod template;

pub use icons::{
    canonical_icon_name, is_valid_emoji, is_valid_icon, DefaultIconMapper, DEFAULT_EMOJI,
    DEFAULT_ICON, ICON_VOCABULARY,
};
pub use model::{
    Choice, ChoiceStep, ContactConfig, ContactFields, ContactStep, DocumentInfoConfig,
    DocumentInfoStep, DocumentUploadConfig, DocumentUploadLabels, DocumentUploadStep,
    DropdownStep, FollowupStep, FormSpecification, LocationConfig, LocationLabels, LocationStep,
    RequiredValidation, SliderStep, Step, StepKind, StepType, Submission, TextValidation,
    TextboxStep, Theme, UiText,
};
pub use schema::form_schema_json;
pub use template::{reference_specification, templated_fallback};
