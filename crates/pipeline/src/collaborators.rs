//! Collaborator seams. Content extraction and semantic analysis are
//! external services consumed through their output contracts; creative
//! strategy and budget allocation ship with deterministic defaults so the
//! pipeline can always complete.

use async_trait::async_trait;

use adpilot_core::config::BudgetConfig;
use adpilot_core::error::PipelineResult;
use adpilot_core::types::{
    CallToActionType, CreativeVariant, ExtractedContent, SemanticAnalysis,
};
use adpilot_strategy::{AdSetStrategy, OptimizationGoal};

/// Fetches a URL and extracts structured text/images/pricing.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> PipelineResult<ExtractedContent>;
}

/// LLM-backed product and competitive analysis over extracted content.
#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    async fn analyze(&self, content: &ExtractedContent) -> PipelineResult<SemanticAnalysis>;
}

/// Generates creative variants for one ad set.
#[async_trait]
pub trait CreativeStrategist: Send + Sync {
    async fn variants(
        &self,
        ad_set: &AdSetStrategy,
        semantic: &SemanticAnalysis,
    ) -> PipelineResult<Vec<CreativeVariant>>;
}

/// Allocates per-ad-set daily budgets from the campaign's daily budget and
/// the strategy's relative weights.
pub trait BudgetOptimizer: Send + Sync {
    fn allocate(&self, daily_budget: f64, ad_sets: &[AdSetStrategy]) -> Vec<f64>;
}

// ─── Rule-based creative strategist ─────────────────────────────────────

/// Deterministic creative generation from the semantic analysis: one
/// variant per planned creative slot, rotating headline angles.
pub struct RuleBasedCreativeStrategist;

#[async_trait]
impl CreativeStrategist for RuleBasedCreativeStrategist {
    async fn variants(
        &self,
        ad_set: &AdSetStrategy,
        semantic: &SemanticAnalysis,
    ) -> PipelineResult<Vec<CreativeVariant>> {
        let headlines = headline_angles(semantic);
        let body = if semantic.product_summary.is_empty() {
            "See why people are switching.".to_string()
        } else {
            semantic.product_summary.clone()
        };
        let cta = cta_for(ad_set.optimization_goal);

        Ok((0..ad_set.creative_count as usize)
            .map(|i| CreativeVariant {
                headline: headlines[i % headlines.len()].clone(),
                body: body.clone(),
                call_to_action: cta,
                asset_url: None,
            })
            .collect())
    }
}

fn headline_angles(semantic: &SemanticAnalysis) -> Vec<String> {
    let mut angles = Vec::new();
    if !semantic.value_proposition.is_empty() {
        angles.push(semantic.value_proposition.clone());
    }
    for keyword in semantic.keywords.iter().take(3) {
        angles.push(format!("The smarter way to {keyword}"));
    }
    for segment in semantic.target_segments.iter().take(2) {
        angles.push(format!("Built for {segment}"));
    }
    if angles.is_empty() {
        angles.push("Discover something better".to_string());
    }
    angles
}

fn cta_for(goal: OptimizationGoal) -> CallToActionType {
    match goal {
        OptimizationGoal::OffsiteConversions => CallToActionType::ShopNow,
        OptimizationGoal::LeadGeneration => CallToActionType::SignUp,
        OptimizationGoal::AppInstalls => CallToActionType::DownloadApp,
        _ => CallToActionType::LearnMore,
    }
}

// ─── Weighted budget optimizer ──────────────────────────────────────────

/// Splits the daily budget proportionally to the strategy weights, flooring
/// every ad set at the configured minimum so no ad set is allocated dust.
pub struct WeightedBudgetOptimizer {
    config: BudgetConfig,
}

impl WeightedBudgetOptimizer {
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }
}

impl BudgetOptimizer for WeightedBudgetOptimizer {
    fn allocate(&self, daily_budget: f64, ad_sets: &[AdSetStrategy]) -> Vec<f64> {
        if ad_sets.is_empty() {
            return Vec::new();
        }
        let total_weight: f64 = ad_sets.iter().map(|a| a.budget_weight.max(0.0)).sum();
        ad_sets
            .iter()
            .map(|a| {
                let share = if total_weight > 0.0 {
                    a.budget_weight.max(0.0) / total_weight
                } else {
                    1.0 / ad_sets.len() as f64
                };
                (daily_budget * share).max(self.config.min_daily_budget)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_strategy::{
        AdSetType, AudienceParameters, BidStrategy, ExpectedMetrics, MetricRange,
    };

    fn ad_set(weight: f64, creative_count: u32, goal: OptimizationGoal) -> AdSetStrategy {
        AdSetStrategy {
            name: "a".to_string(),
            adset_type: AdSetType::Broad,
            audience: AudienceParameters::default(),
            budget_weight: weight,
            optimization_goal: goal,
            bid_strategy: BidStrategy::LowestCostWithoutCap,
            creative_count,
            expected_metrics: ExpectedMetrics {
                ctr: MetricRange {
                    low: 0.01,
                    high: 0.02,
                },
                cpm: MetricRange {
                    low: 5.0,
                    high: 10.0,
                },
                learning_phase_days: 7,
            },
        }
    }

    #[test]
    fn test_weighted_split() {
        let optimizer = WeightedBudgetOptimizer::new(BudgetConfig::default());
        let ad_sets = vec![
            ad_set(0.6, 1, OptimizationGoal::OffsiteConversions),
            ad_set(0.4, 1, OptimizationGoal::OffsiteConversions),
        ];
        let budgets = optimizer.allocate(100.0, &ad_sets);
        assert!((budgets[0] - 60.0).abs() < 1e-9);
        assert!((budgets[1] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weights_split_evenly() {
        let optimizer = WeightedBudgetOptimizer::new(BudgetConfig::default());
        let ad_sets = vec![
            ad_set(0.0, 1, OptimizationGoal::OffsiteConversions),
            ad_set(0.0, 1, OptimizationGoal::OffsiteConversions),
        ];
        let budgets = optimizer.allocate(50.0, &ad_sets);
        assert!((budgets[0] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_daily_budget_floor() {
        let optimizer = WeightedBudgetOptimizer::new(BudgetConfig::default());
        let ad_sets = vec![
            ad_set(0.99, 1, OptimizationGoal::OffsiteConversions),
            ad_set(0.01, 1, OptimizationGoal::OffsiteConversions),
        ];
        let budgets = optimizer.allocate(100.0, &ad_sets);
        assert!(budgets[1] >= 5.0);
    }

    #[tokio::test]
    async fn test_rule_based_creatives_honor_count_and_goal() {
        let semantic = SemanticAnalysis {
            product_summary: "A modular standing desk.".to_string(),
            value_proposition: "Stand more, ache less".to_string(),
            keywords: vec!["work comfortably".to_string()],
            ..Default::default()
        };
        let strategist = RuleBasedCreativeStrategist;
        let variants = strategist
            .variants(&ad_set(1.0, 3, OptimizationGoal::OffsiteConversions), &semantic)
            .await
            .unwrap();
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].headline, "Stand more, ache less");
        assert!(variants
            .iter()
            .all(|v| v.call_to_action == CallToActionType::ShopNow));

        let lead_variants = strategist
            .variants(&ad_set(1.0, 1, OptimizationGoal::LeadGeneration), &semantic)
            .await
            .unwrap();
        assert_eq!(lead_variants[0].call_to_action, CallToActionType::SignUp);
    }
}
