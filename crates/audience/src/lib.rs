pub mod constructor;
pub mod interests;
pub mod types;
pub mod validation;

pub use constructor::{AudienceConstructor, AudienceRequirements};
pub use interests::{GraphInterestResolver, InterestResolver, PLACEHOLDER_INTEREST_ID};
pub use types::{
    AudienceResult, AudienceSpecRef, FlexibleSpec, GeoLocations, InterestCombination,
    InterestSpec, ReachEstimate, Targeting, ValidationStatus,
};
