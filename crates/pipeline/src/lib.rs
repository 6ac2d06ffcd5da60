pub mod collaborators;
pub mod driver;

pub use collaborators::{
    BudgetOptimizer, ContentExtractor, CreativeStrategist, RuleBasedCreativeStrategist,
    SemanticAnalyzer, WeightedBudgetOptimizer,
};
pub use driver::{CampaignPipeline, PipelineFailure, PipelineRun};
