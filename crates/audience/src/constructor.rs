//! Audience constructor — turns each ad-set strategy into a concrete,
//! platform-compliant targeting specification with reach estimation,
//! exclusion logic and validation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use adpilot_core::config::AudienceConfig;
use adpilot_strategy::{AdSetStrategy, AdSetType, StrategyResult};

use crate::interests::{placeholder_interests, InterestResolver, PLACEHOLDER_INTEREST_ID};
use crate::types::{
    AudienceResult, AudienceSpecRef, FlexibleSpec, GeoLocations, InterestCombination,
    ReachEstimate, Targeting, ValidationStatus,
};
use crate::validation;

// Type-specific baseline reach before discounts.
const RETARGETING_BASE: ReachEstimate = ReachEstimate {
    min: 1_000,
    max: 50_000,
};
const INTEREST_BASE: ReachEstimate = ReachEstimate {
    min: 1_000_000,
    max: 20_000_000,
};
const BROAD_BASE: ReachEstimate = ReachEstimate {
    min: 10_000_000,
    max: 50_000_000,
};
/// Lookalike reach per similarity percent.
const LOOKALIKE_REACH_PER_PCT: f64 = 2_000_000.0;

/// Caller-supplied constraints common to all ad sets.
#[derive(Debug, Clone, Default)]
pub struct AudienceRequirements {
    /// ISO country codes.
    pub countries: Vec<String>,
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    pub interest_combination: InterestCombination,
}

pub struct AudienceConstructor {
    resolver: Option<Arc<dyn InterestResolver>>,
    config: AudienceConfig,
}

impl AudienceConstructor {
    pub fn new(config: AudienceConfig) -> Self {
        Self {
            resolver: None,
            config,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn InterestResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Construct one audience per ad-set strategy. Construction is
    /// independent per ad set and runs concurrently; the overlap pass
    /// afterwards needs every audience and is sequential.
    pub async fn construct_audiences(
        &self,
        strategy: &StrategyResult,
        requirements: &AudienceRequirements,
    ) -> Vec<AudienceResult> {
        let futures = strategy
            .ad_sets
            .iter()
            .map(|ad_set| self.construct_one(ad_set, requirements));
        let mut audiences = join_all(futures).await;

        validation::detect_overlaps(&mut audiences);

        let errors = audiences
            .iter()
            .filter(|a| a.validation_status == ValidationStatus::Error)
            .count();
        metrics::counter!("audiences.constructed").increment(audiences.len() as u64);
        info!(
            total = audiences.len(),
            errors, "audience construction complete"
        );
        audiences
    }

    async fn construct_one(
        &self,
        ad_set: &AdSetStrategy,
        requirements: &AudienceRequirements,
    ) -> AudienceResult {
        let targeting = Targeting {
            geo_locations: GeoLocations {
                countries: requirements.countries.clone(),
            },
            age_min: requirements.age_min.unwrap_or(self.config.default_age_min),
            age_max: requirements.age_max.unwrap_or(self.config.default_age_max),
            genders: None,
            flexible_spec: Vec::new(),
            custom_audiences: Vec::new(),
            excluded_custom_audiences: Vec::new(),
        };
        let mut audience = AudienceResult::new(ad_set.name.clone(), ad_set.adset_type, targeting);

        let baseline = match ad_set.adset_type {
            AdSetType::Retargeting => self.build_retargeting(ad_set, &mut audience),
            AdSetType::Lookalike => self.build_lookalike(ad_set, &mut audience),
            AdSetType::Interest => self.build_interest(ad_set, requirements, &mut audience).await,
            AdSetType::Broad => Some(BROAD_BASE),
        };

        if let Some(baseline) = baseline {
            self.apply_exclusions(ad_set, &mut audience);
            audience.estimated_reach = self.discounted_reach(baseline, &audience.targeting);
        }
        // Construction errors (missing percentage, empty interests) leave
        // the reach at {0,0}.

        validation::validate(&mut audience, &self.config);
        audience
    }

    /// Retargeting: site visitors within the day window, minus recent
    /// purchasers. High intent, small reach.
    fn build_retargeting(
        &self,
        ad_set: &AdSetStrategy,
        audience: &mut AudienceResult,
    ) -> Option<ReachEstimate> {
        let days = ad_set
            .audience
            .days
            .unwrap_or(self.config.default_retargeting_days);
        audience
            .targeting
            .custom_audiences
            .push(AudienceSpecRef {
                id: format!("{{{{WEBSITE_VISITORS_{days}D}}}}"),
            });
        audience
            .targeting
            .excluded_custom_audiences
            .push(AudienceSpecRef {
                id: format!(
                    "{{{{PURCHASERS_{}D}}}}",
                    self.config.purchaser_exclusion_days
                ),
            });
        audience.exclusion_rationale.push(format!(
            "Recent purchasers ({}d) excluded to avoid paying to re-reach converted users",
            self.config.purchaser_exclusion_days
        ));
        Some(RETARGETING_BASE)
    }

    /// Lookalike: reach scales linearly with the similarity percentage.
    fn build_lookalike(
        &self,
        ad_set: &AdSetStrategy,
        audience: &mut AudienceResult,
    ) -> Option<ReachEstimate> {
        let Some(raw_pct) = ad_set.audience.percentage else {
            audience.flag(
                ValidationStatus::Error,
                "lookalike ad set is missing the required `percentage` parameter",
            );
            return None;
        };

        let pct = raw_pct.clamp(1.0, 10.0);
        if (pct - raw_pct).abs() > f64::EPSILON {
            audience.flag(
                ValidationStatus::Warning,
                format!("lookalike percentage {raw_pct} clamped to {pct} (allowed range 1-10)"),
            );
        }

        audience
            .targeting
            .custom_audiences
            .push(AudienceSpecRef {
                id: format!("{{{{LOOKALIKE_{}PCT}}}}", pct.round() as u32),
            });

        let base = LOOKALIKE_REACH_PER_PCT * pct;
        Some(ReachEstimate {
            min: (base * 0.8) as u64,
            max: (base * 1.2) as u64,
        })
    }

    /// Interest: resolve names to platform IDs, degrading to placeholders
    /// when the lookup service is unavailable.
    async fn build_interest(
        &self,
        ad_set: &AdSetStrategy,
        requirements: &AudienceRequirements,
        audience: &mut AudienceResult,
    ) -> Option<ReachEstimate> {
        let names = &ad_set.audience.interests;
        if names.is_empty() {
            audience.flag(
                ValidationStatus::Error,
                "interest ad set requires at least one interest",
            );
            return None;
        }

        let specs = match &self.resolver {
            Some(resolver) => match resolver.resolve(names).await {
                Ok(specs) => specs,
                Err(e) => {
                    warn!(error = %e, "interest lookup unavailable; using placeholder IDs");
                    metrics::counter!("audiences.interest_lookup_failures").increment(1);
                    audience.flag(
                        ValidationStatus::Warning,
                        "interest IDs could not be validated; using placeholders pending live validation",
                    );
                    audience.unvalidated_interests = true;
                    placeholder_interests(names)
                }
            },
            None => {
                audience.flag(
                    ValidationStatus::Warning,
                    "no interest resolver configured; using placeholders pending live validation",
                );
                audience.unvalidated_interests = true;
                placeholder_interests(names)
            }
        };

        if specs.iter().any(|s| s.id == PLACEHOLDER_INTEREST_ID) {
            audience.unvalidated_interests = true;
        }

        audience.targeting.flexible_spec = match requirements.interest_combination {
            InterestCombination::Stacked => vec![FlexibleSpec { interests: specs }],
            InterestCombination::Flexible => specs
                .into_iter()
                .map(|spec| FlexibleSpec {
                    interests: vec![spec],
                })
                .collect(),
        };

        Some(INTEREST_BASE)
    }

    /// Map strategy-level exclusion identifiers onto excluded-custom-
    /// audience references.
    fn apply_exclusions(&self, ad_set: &AdSetStrategy, audience: &mut AudienceResult) {
        for exclusion in &ad_set.audience.exclusions {
            audience
                .targeting
                .excluded_custom_audiences
                .push(AudienceSpecRef {
                    id: exclusion.clone(),
                });
            audience
                .exclusion_rationale
                .push(format!("Excluded audience `{exclusion}` per strategy"));
        }
    }

    /// Each active targeting dimension narrows delivery: interests,
    /// custom-audience references and exclusions each multiply the baseline
    /// by a fixed factor.
    fn discounted_reach(&self, baseline: ReachEstimate, targeting: &Targeting) -> ReachEstimate {
        let mut factor = 1.0;
        if targeting.has_interests() {
            factor *= self.config.interest_discount;
        }
        if !targeting.custom_audiences.is_empty() {
            factor *= self.config.custom_audience_discount;
        }
        if !targeting.excluded_custom_audiences.is_empty() {
            factor *= self.config.exclusion_discount;
        }
        ReachEstimate {
            min: (baseline.min as f64 * factor) as u64,
            max: (baseline.max as f64 * factor) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::error::{PipelineError, PipelineResult};
    use adpilot_core::types::CampaignObjective;
    use adpilot_strategy::{
        AudienceParameters, BidStrategy, ExpectedMetrics, MetricRange, OptimizationGoal,
    };
    use async_trait::async_trait;

    use crate::types::InterestSpec;

    fn strategy_with(ad_sets: Vec<AdSetStrategy>) -> StrategyResult {
        StrategyResult {
            campaign_objective: CampaignObjective::OutcomeSales,
            approach: adpilot_audit::StrategicApproach::PerformanceScaling,
            ad_sets,
            rationale: None,
        }
    }

    fn ad_set(name: &str, adset_type: AdSetType, audience: AudienceParameters) -> AdSetStrategy {
        AdSetStrategy {
            name: name.to_string(),
            adset_type,
            audience,
            budget_weight: 1.0,
            optimization_goal: OptimizationGoal::OffsiteConversions,
            bid_strategy: BidStrategy::LowestCostWithoutCap,
            creative_count: 1,
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

    fn requirements() -> AudienceRequirements {
        AudienceRequirements {
            countries: vec!["US".to_string()],
            age_min: None,
            age_max: None,
            interest_combination: InterestCombination::Stacked,
        }
    }

    struct StaticResolver;

    #[async_trait]
    impl InterestResolver for StaticResolver {
        async fn resolve(&self, names: &[String]) -> PipelineResult<Vec<InterestSpec>> {
            Ok(names
                .iter()
                .map(|n| InterestSpec {
                    id: format!("6003{}", n.len()),
                    name: n.clone(),
                })
                .collect())
        }
    }

    struct DownResolver;

    #[async_trait]
    impl InterestResolver for DownResolver {
        async fn resolve(&self, _names: &[String]) -> PipelineResult<Vec<InterestSpec>> {
            Err(PipelineError::InterestLookup("service unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_lookalike_without_percentage_errors() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());
        let strategy = strategy_with(vec![ad_set(
            "lal",
            AdSetType::Lookalike,
            AudienceParameters::default(),
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;

        let a = &audiences[0];
        assert_eq!(a.validation_status, ValidationStatus::Error);
        assert!(a
            .validation_messages
            .iter()
            .any(|m| m.contains("percentage")));
        assert_eq!(a.estimated_reach, ReachEstimate { min: 0, max: 0 });
    }

    #[tokio::test]
    async fn test_lookalike_reach_scales_with_percentage() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());
        let strategy = strategy_with(vec![ad_set(
            "lal",
            AdSetType::Lookalike,
            AudienceParameters {
                percentage: Some(2.0),
                ..Default::default()
            },
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;
        // 2% → base 4M, ±20%, then ×0.1 for the lookalike reference.
        assert_eq!(audiences[0].estimated_reach.min, 320_000);
        assert_eq!(audiences[0].estimated_reach.max, 480_000);
    }

    #[tokio::test]
    async fn test_empty_interest_list_errors() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());
        let strategy = strategy_with(vec![ad_set(
            "int",
            AdSetType::Interest,
            AudienceParameters::default(),
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;
        assert_eq!(audiences[0].validation_status, ValidationStatus::Error);
    }

    #[tokio::test]
    async fn test_interest_resolver_down_degrades_to_placeholders() {
        let constructor = AudienceConstructor::new(AudienceConfig::default())
            .with_resolver(Arc::new(DownResolver));
        let strategy = strategy_with(vec![ad_set(
            "int",
            AdSetType::Interest,
            AudienceParameters {
                interests: vec!["Yoga".to_string()],
                ..Default::default()
            },
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;

        let a = &audiences[0];
        assert!(a.unvalidated_interests);
        assert_eq!(a.validation_status, ValidationStatus::Warning);
        assert_eq!(
            a.targeting.flexible_spec[0].interests[0].id,
            PLACEHOLDER_INTEREST_ID
        );
    }

    #[tokio::test]
    async fn test_stacked_vs_flexible_grouping() {
        let constructor = AudienceConstructor::new(AudienceConfig::default())
            .with_resolver(Arc::new(StaticResolver));
        let interests = AudienceParameters {
            interests: vec!["Yoga".to_string(), "Running".to_string()],
            ..Default::default()
        };

        let stacked = constructor
            .construct_audiences(
                &strategy_with(vec![ad_set("int", AdSetType::Interest, interests.clone())]),
                &requirements(),
            )
            .await;
        assert_eq!(stacked[0].targeting.flexible_spec.len(), 1);
        assert_eq!(stacked[0].targeting.flexible_spec[0].interests.len(), 2);
        // Interest targeting narrows the 1M–20M baseline by ×0.3.
        assert_eq!(stacked[0].estimated_reach.max, 6_000_000);
        assert_eq!(stacked[0].estimated_reach.min, 300_000);

        let mut req = requirements();
        req.interest_combination = InterestCombination::Flexible;
        let flexible = constructor
            .construct_audiences(
                &strategy_with(vec![ad_set("int", AdSetType::Interest, interests)]),
                &req,
            )
            .await;
        assert_eq!(flexible[0].targeting.flexible_spec.len(), 2);
    }

    #[tokio::test]
    async fn test_broad_keeps_demographics_only() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());
        let strategy = strategy_with(vec![ad_set(
            "broad",
            AdSetType::Broad,
            AudienceParameters::default(),
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;

        let t = &audiences[0].targeting;
        assert!(t.flexible_spec.is_empty());
        assert!(t.custom_audiences.is_empty());
        assert_eq!(audiences[0].estimated_reach, BROAD_BASE);
        assert_eq!(audiences[0].validation_status, ValidationStatus::Valid);
    }

    #[tokio::test]
    async fn test_exclusions_never_increase_reach() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());

        let plain = strategy_with(vec![ad_set(
            "broad",
            AdSetType::Broad,
            AudienceParameters::default(),
        )]);
        let excluded = strategy_with(vec![ad_set(
            "broad",
            AdSetType::Broad,
            AudienceParameters {
                exclusions: vec!["ca_existing_customers".to_string()],
                ..Default::default()
            },
        )]);

        let base = constructor
            .construct_audiences(&plain, &requirements())
            .await;
        let narrowed = constructor
            .construct_audiences(&excluded, &requirements())
            .await;

        assert!(narrowed[0].estimated_reach.max <= base[0].estimated_reach.max);
        assert!(narrowed[0].estimated_reach.min <= base[0].estimated_reach.min);
        // ×0.9 exclusion discount on the 10M–50M baseline.
        assert_eq!(narrowed[0].estimated_reach.max, 45_000_000);
    }

    #[tokio::test]
    async fn test_retargeting_excludes_recent_purchasers() {
        let constructor = AudienceConstructor::new(AudienceConfig::default());
        let strategy = strategy_with(vec![ad_set(
            "ret",
            AdSetType::Retargeting,
            AudienceParameters {
                days: Some(30),
                ..Default::default()
            },
        )]);
        let audiences = constructor
            .construct_audiences(&strategy, &requirements())
            .await;

        let t = &audiences[0].targeting;
        assert_eq!(t.custom_audiences[0].id, "{{WEBSITE_VISITORS_30D}}");
        assert!(t
            .excluded_custom_audiences
            .iter()
            .any(|r| r.id.contains("PURCHASERS")));
        assert!(!audiences[0].exclusion_rationale.is_empty());
        // 1K–50K baseline ×0.1 (custom audience) ×0.9 (exclusion).
        assert_eq!(audiences[0].estimated_reach.max, 4_500);
        assert!(audiences[0].usable());
    }
}
