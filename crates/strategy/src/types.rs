use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use adpilot_audit::StrategicApproach;
use adpilot_core::types::CampaignObjective;

/// Ad-set archetype. Governs which audience-construction branch applies
/// downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdSetType {
    Retargeting,
    Lookalike,
    Interest,
    Broad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationGoal {
    OffsiteConversions,
    LinkClicks,
    LandingPageViews,
    LeadGeneration,
    Reach,
    Impressions,
    AppInstalls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStrategy {
    LowestCostWithoutCap,
    LowestCostWithBidCap,
    CostCap,
}

/// Type-specific audience parameters. Which fields apply depends on the
/// ad-set type: `days` for retargeting, `percentage` for lookalike,
/// `interests` for interest targeting; `exclusions` applies everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AudienceParameters {
    /// Retargeting window in days.
    #[serde(default)]
    pub days: Option<u32>,
    /// Lookalike similarity percentage, 1–10.
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Audience identifiers to exclude.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct MetricRange {
    pub low: f64,
    pub high: f64,
}

/// Advisory performance expectations; not enforced anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedMetrics {
    /// Expected CTR range as fractions (0.01 = 1%).
    pub ctr: MetricRange,
    /// Expected CPM range in major currency units.
    pub cpm: MetricRange,
    pub learning_phase_days: u32,
}

/// One planned ad set within the campaign.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdSetStrategy {
    pub name: String,
    pub adset_type: AdSetType,
    pub audience: AudienceParameters,
    /// Fraction of total budget. Relative proportion — the set of weights
    /// need not sum to exactly 1.
    pub budget_weight: f64,
    pub optimization_goal: OptimizationGoal,
    pub bid_strategy: BidStrategy,
    /// Planned creative variants for this ad set.
    pub creative_count: u32,
    pub expected_metrics: ExpectedMetrics,
}

/// Full campaign strategy — the strategy model's output contract, also
/// produced by the rule-based fallback.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StrategyResult {
    pub campaign_objective: CampaignObjective,
    pub approach: StrategicApproach,
    pub ad_sets: Vec<AdSetStrategy>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl StrategyResult {
    pub fn total_creatives(&self) -> u32 {
        self.ad_sets.iter().map(|a| a.creative_count).sum()
    }
}
