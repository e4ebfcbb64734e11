//! 核心编排层：失败原因、兜底链路、主控流程

pub mod error;
pub mod orchestrator;
pub mod recovery;

pub use error::FailureReason;
pub use orchestrator::{SynthesisDiagnostic, SynthesisOrchestrator, SynthesisOutcome};
pub use recovery::{GenerationTier, RecoveryAction, RecoveryEngine};
