pub mod engine;
pub mod formats;
pub mod types;

pub use engine::{determine_placements, AdSetPlacementInput};
pub use formats::FormatAnalysis;
pub use types::{
    CreativeRequirement, PerformanceExpectation, PlacementResult, PlacementSet, PlacementWarning,
    VolumePotential, WarningSeverity,
};
