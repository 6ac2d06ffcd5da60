//! Deterministic rule-based strategy — the guaranteed-safe default used
//! whenever the strategy model is unavailable or returns an invalid reply.

use adpilot_audit::{AuditResult, DataLevel, StrategicApproach};
use adpilot_core::types::{BusinessGoal, CampaignObjective, SemanticAnalysis};

use crate::types::{
    AdSetStrategy, AdSetType, AudienceParameters, BidStrategy, ExpectedMetrics, MetricRange,
    OptimizationGoal, StrategyResult,
};

/// Build a known-good static plan from the audit tier. No external calls.
pub fn fallback_strategy(
    audit: &AuditResult,
    semantic: &SemanticAnalysis,
    goal: BusinessGoal,
) -> StrategyResult {
    match audit.data_level {
        DataLevel::RichData => performance_scaling(goal),
        DataLevel::LowData | DataLevel::ZeroData => discovery_first(semantic, goal),
    }
}

/// Rich accounts: split between proven retargeting and a 1% lookalike.
fn performance_scaling(goal: BusinessGoal) -> StrategyResult {
    StrategyResult {
        campaign_objective: CampaignObjective::for_goal(goal),
        approach: StrategicApproach::PerformanceScaling,
        ad_sets: vec![
            AdSetStrategy {
                name: "Retargeting — site visitors 30d".to_string(),
                adset_type: AdSetType::Retargeting,
                audience: AudienceParameters {
                    days: Some(30),
                    ..Default::default()
                },
                budget_weight: 0.5,
                optimization_goal: OptimizationGoal::OffsiteConversions,
                bid_strategy: BidStrategy::LowestCostWithoutCap,
                creative_count: 2,
                expected_metrics: ExpectedMetrics {
                    ctr: MetricRange {
                        low: 0.015,
                        high: 0.035,
                    },
                    cpm: MetricRange {
                        low: 12.0,
                        high: 25.0,
                    },
                    learning_phase_days: 4,
                },
            },
            AdSetStrategy {
                name: "Lookalike 1% — purchasers".to_string(),
                adset_type: AdSetType::Lookalike,
                audience: AudienceParameters {
                    percentage: Some(1.0),
                    ..Default::default()
                },
                budget_weight: 0.5,
                optimization_goal: OptimizationGoal::OffsiteConversions,
                bid_strategy: BidStrategy::LowestCostWithoutCap,
                creative_count: 2,
                expected_metrics: ExpectedMetrics {
                    ctr: MetricRange {
                        low: 0.01,
                        high: 0.02,
                    },
                    cpm: MetricRange {
                        low: 8.0,
                        high: 18.0,
                    },
                    learning_phase_days: 7,
                },
            },
        ],
        rationale: Some(
            "Rule-based plan: rich account data supports retargeting plus a 1% lookalike"
                .to_string(),
        ),
    }
}

/// Cold or thin accounts: one broad ad set, letting delivery optimization
/// find the audience.
fn discovery_first(semantic: &SemanticAnalysis, goal: BusinessGoal) -> StrategyResult {
    let objective = match goal {
        // Cold accounts cannot optimize for purchases they have never seen.
        BusinessGoal::Sales => CampaignObjective::OutcomeTraffic,
        other => CampaignObjective::for_goal(other),
    };
    StrategyResult {
        campaign_objective: objective,
        approach: StrategicApproach::DiscoveryFirst,
        ad_sets: vec![AdSetStrategy {
            name: "Broad discovery".to_string(),
            adset_type: AdSetType::Broad,
            audience: AudienceParameters {
                exclusions: Vec::new(),
                ..Default::default()
            },
            budget_weight: 1.0,
            optimization_goal: OptimizationGoal::LandingPageViews,
            bid_strategy: BidStrategy::LowestCostWithoutCap,
            creative_count: 3,
            expected_metrics: ExpectedMetrics {
                ctr: MetricRange {
                    low: 0.008,
                    high: 0.015,
                },
                cpm: MetricRange {
                    low: 5.0,
                    high: 12.0,
                },
                learning_phase_days: 7,
            },
        }],
        rationale: Some(format!(
            "Rule-based plan: insufficient account data for audience targeting; \
             broad discovery for {}",
            if semantic.product_summary.is_empty() {
                "the product"
            } else {
                &semantic.product_summary
            }
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::config::AuditConfig;
    use adpilot_core::types::RawAccountData;

    #[test]
    fn test_cold_account_gets_single_broad_ad_set() {
        let audit = adpilot_audit::audit(&RawAccountData::default(), &AuditConfig::default());
        let strategy =
            fallback_strategy(&audit, &SemanticAnalysis::default(), BusinessGoal::Sales);
        assert_eq!(strategy.approach, StrategicApproach::DiscoveryFirst);
        assert_eq!(strategy.ad_sets.len(), 1);
        assert_eq!(strategy.ad_sets[0].adset_type, AdSetType::Broad);
        // Cold accounts are steered away from purchase optimization.
        assert_eq!(
            strategy.campaign_objective,
            CampaignObjective::OutcomeTraffic
        );
    }
}
