//! 合成管线各阶段：prompt、JSON 提取、结构规整、JSON 修复、选项增强、不变量强制

pub mod augmenter;
pub mod enforcer;
pub mod extractor;
pub mod normalizer;
pub mod prompts;
pub mod repair;

pub use augmenter::{AugmentationReport, BatchReport, OptionAugmenter};
pub use enforcer::{check_invariants, enforce, reorder_terminal_steps};
pub use extractor::{extract_json, extract_json_array};
pub use normalizer::{has_steps, into_specification, normalize_form, NormalizedForm};
pub use prompts::PromptSet;
pub use repair::{JsonRepairAgent, RepairError};
