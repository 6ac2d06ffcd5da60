pub mod engine;
pub mod fallback;
pub mod model;
pub mod types;

pub use engine::StrategyEngine;
pub use model::StrategyModel;
pub use types::{
    AdSetStrategy, AdSetType, AudienceParameters, BidStrategy, ExpectedMetrics, MetricRange,
    OptimizationGoal, StrategyResult,
};
