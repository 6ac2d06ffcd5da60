//! Strategy engine — model-first with a deterministic fallback, plus the
//! global creative-count cap.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use adpilot_audit::AuditResult;
use adpilot_core::config::StrategyConfig;
use adpilot_core::error::{PipelineError, PipelineResult};
use adpilot_core::types::{BusinessGoal, CampaignInput, SemanticAnalysis};

use crate::fallback::fallback_strategy;
use crate::model::{build_strategy_prompt, parse_strategy_reply, StrategyModel};
use crate::types::{AdSetStrategy, StrategyResult};

/// Produces a campaign strategy. The model path is best-effort; the
/// rule-based fallback guarantees strategy generation never fails the
/// pipeline outright.
pub struct StrategyEngine {
    model: Option<Arc<dyn StrategyModel>>,
    config: StrategyConfig,
}

impl StrategyEngine {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            model: None,
            config,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn StrategyModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Generate a strategy for the campaign. Any model failure — transport,
    /// timeout, schema violation — degrades to the rule-based plan.
    pub async fn strategize(
        &self,
        audit: &AuditResult,
        semantic: &SemanticAnalysis,
        goal: BusinessGoal,
        input: &CampaignInput,
    ) -> PipelineResult<StrategyResult> {
        let mut strategy = match self.try_model(audit, semantic, goal, input).await {
            Some(result) => {
                metrics::counter!("strategy.model_generated").increment(1);
                result
            }
            None => {
                metrics::counter!("strategy.fallback_used").increment(1);
                fallback_strategy(audit, semantic, goal)
            }
        };

        if strategy.ad_sets.is_empty() {
            // The fallback always yields at least one ad set, so an empty
            // plan here means the model returned a valid-but-useless reply.
            warn!("model strategy had no ad sets; using rule-based plan");
            strategy = fallback_strategy(audit, semantic, goal);
        }
        if strategy.ad_sets.is_empty() {
            return Err(PipelineError::Strategy(
                "no ad-set strategies could be produced".to_string(),
            ));
        }

        cap_creative_counts(&mut strategy.ad_sets, self.config.max_total_creatives);
        info!(
            objective = ?strategy.campaign_objective,
            approach = ?strategy.approach,
            ad_sets = strategy.ad_sets.len(),
            total_creatives = strategy.ad_sets.iter().map(|a| a.creative_count).sum::<u32>(),
            "strategy ready"
        );
        Ok(strategy)
    }

    async fn try_model(
        &self,
        audit: &AuditResult,
        semantic: &SemanticAnalysis,
        goal: BusinessGoal,
        input: &CampaignInput,
    ) -> Option<StrategyResult> {
        let model = self.model.as_ref()?;
        let prompt = build_strategy_prompt(audit, semantic, goal, input);
        let timeout = Duration::from_secs(self.config.model_timeout_secs);

        let reply = match tokio::time::timeout(timeout, model.generate_strategy(&prompt)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, "strategy model call failed; falling back");
                return None;
            }
            Err(_) => {
                warn!(timeout_secs = self.config.model_timeout_secs, "strategy model timed out; falling back");
                return None;
            }
        };

        match parse_strategy_reply(&reply) {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                warn!(error = %e, "strategy reply rejected; falling back");
                None
            }
        }
    }
}

/// Cap total planned creatives across all ad sets. When the plan exceeds
/// the cap, every ad set is reset to one variant and the remainder is dealt
/// round-robin from the first ad set. Ad sets never drop below one, so with
/// more ad sets than the cap the floor wins.
pub fn cap_creative_counts(ad_sets: &mut [AdSetStrategy], max_total: u32) {
    let total: u32 = ad_sets.iter().map(|a| a.creative_count).sum();
    if total <= max_total {
        // Still enforce the one-variant floor on under-asking plans.
        for ad_set in ad_sets.iter_mut() {
            ad_set.creative_count = ad_set.creative_count.max(1);
        }
        return;
    }

    for ad_set in ad_sets.iter_mut() {
        ad_set.creative_count = 1;
    }
    let mut remaining = max_total.saturating_sub(ad_sets.len() as u32);
    let mut idx = 0;
    while remaining > 0 && !ad_sets.is_empty() {
        ad_sets[idx % ad_sets.len()].creative_count += 1;
        idx += 1;
        remaining -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AdSetType, AudienceParameters, BidStrategy, ExpectedMetrics, MetricRange, OptimizationGoal,
    };
    use adpilot_core::config::AuditConfig;
    use adpilot_core::types::RawAccountData;
    use async_trait::async_trait;

    fn ad_set(name: &str, creative_count: u32) -> AdSetStrategy {
        AdSetStrategy {
            name: name.to_string(),
            adset_type: AdSetType::Broad,
            audience: AudienceParameters::default(),
            budget_weight: 0.5,
            optimization_goal: OptimizationGoal::LandingPageViews,
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

    fn sample_input() -> CampaignInput {
        CampaignInput {
            product_url: "https://shop.example.com/widget".to_string(),
            business_goal: BusinessGoal::Sales,
            total_budget: 500.0,
            daily_budget: 50.0,
            currency: "USD".to_string(),
            page_id: "page-1".to_string(),
            pixel_id: None,
            instagram_actor_id: None,
            destination_url: None,
            countries: vec!["US".to_string()],
            creative_assets: Vec::new(),
        }
    }

    struct FailingModel;

    #[async_trait]
    impl StrategyModel for FailingModel {
        async fn generate_strategy(&self, _prompt: &str) -> PipelineResult<String> {
            Err(PipelineError::Model("connection refused".to_string()))
        }
    }

    struct GarbageModel;

    #[async_trait]
    impl StrategyModel for GarbageModel {
        async fn generate_strategy(&self, _prompt: &str) -> PipelineResult<String> {
            Ok("here is your strategy: buy ads".to_string())
        }
    }

    #[test]
    fn test_cap_redistributes_round_robin() {
        let mut ad_sets = vec![ad_set("a", 4), ad_set("b", 4), ad_set("c", 4)];
        cap_creative_counts(&mut ad_sets, 5);
        // Everyone reset to 1, remaining 2 dealt from index 0.
        assert_eq!(
            ad_sets.iter().map(|a| a.creative_count).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert_eq!(ad_sets.iter().map(|a| a.creative_count).sum::<u32>(), 5);
    }

    #[test]
    fn test_cap_leaves_small_plans_alone() {
        let mut ad_sets = vec![ad_set("a", 2), ad_set("b", 2)];
        cap_creative_counts(&mut ad_sets, 5);
        assert_eq!(
            ad_sets.iter().map(|a| a.creative_count).collect::<Vec<_>>(),
            vec![2, 2]
        );
    }

    #[test]
    fn test_cap_enforces_floor_of_one() {
        let mut ad_sets = vec![ad_set("a", 0), ad_set("b", 3)];
        cap_creative_counts(&mut ad_sets, 5);
        assert!(ad_sets.iter().all(|a| a.creative_count >= 1));
    }

    #[tokio::test]
    async fn test_failing_model_falls_back() {
        let engine =
            StrategyEngine::new(StrategyConfig::default()).with_model(Arc::new(FailingModel));
        let audit = adpilot_audit::audit(&RawAccountData::default(), &AuditConfig::default());
        let strategy = engine
            .strategize(
                &audit,
                &SemanticAnalysis::default(),
                BusinessGoal::Sales,
                &sample_input(),
            )
            .await
            .unwrap();
        assert_eq!(strategy.ad_sets.len(), 1);
        assert_eq!(strategy.ad_sets[0].adset_type, AdSetType::Broad);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let engine =
            StrategyEngine::new(StrategyConfig::default()).with_model(Arc::new(GarbageModel));
        let audit = adpilot_audit::audit(&RawAccountData::default(), &AuditConfig::default());
        let strategy = engine
            .strategize(
                &audit,
                &SemanticAnalysis::default(),
                BusinessGoal::Traffic,
                &sample_input(),
            )
            .await
            .unwrap();
        assert!(!strategy.ad_sets.is_empty());
    }

    #[tokio::test]
    async fn test_no_model_uses_fallback_directly() {
        let engine = StrategyEngine::new(StrategyConfig::default());
        let audit = adpilot_audit::audit(&RawAccountData::default(), &AuditConfig::default());
        let strategy = engine
            .strategize(
                &audit,
                &SemanticAnalysis::default(),
                BusinessGoal::Leads,
                &sample_input(),
            )
            .await
            .unwrap();
        assert!(!strategy.ad_sets.is_empty());
        let total: u32 = strategy.ad_sets.iter().map(|a| a.creative_count).sum();
        assert!(total <= 5);
    }
}
