pub mod orchestrator;
pub mod payloads;
pub mod tokens;
pub mod types;

pub use orchestrator::orchestrate;
pub use tokens::DependencyMap;
pub use types::{
    ApiPayload, AssembledAdSet, CampaignOrchestrationResult, CampaignStructure, ChecklistItem,
    ExecutionStep, PayloadBody, RiskFlag, RiskSeverity, RollbackStep, SupportHook,
};
