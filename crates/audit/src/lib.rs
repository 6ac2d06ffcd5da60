pub mod auditor;

pub use auditor::{
    audit, AccountSummary, AuditResult, DataLevel, PixelHealth, Recommendations, StrategicApproach,
};
