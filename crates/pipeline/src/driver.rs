//! Sequential pipeline driver. Each stage consumes the previous stage's
//! output and publishes a progress snapshot before the next begins; a
//! failure publishes the partial snapshot plus the error instead of
//! discarding prior results.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use adpilot_audience::{
    AudienceConstructor, AudienceRequirements, AudienceResult, InterestResolver,
};
use adpilot_audit::AuditResult;
use adpilot_core::config::PipelineConfig;
use adpilot_core::error::PipelineError;
use adpilot_core::progress::{
    noop_sink, PipelineProgress, PipelineStage, ProgressSink,
};
use adpilot_core::types::{
    CampaignInput, CreativeVariant, ExtractedContent, RawAccountData, SemanticAnalysis,
};
use adpilot_orchestrator::{
    orchestrate, AssembledAdSet, CampaignOrchestrationResult, CampaignStructure,
};
use adpilot_placement::{determine_placements, AdSetPlacementInput, PlacementResult,
    WarningSeverity};
use adpilot_strategy::{StrategyEngine, StrategyModel, StrategyResult};

use crate::collaborators::{
    BudgetOptimizer, ContentExtractor, CreativeStrategist, RuleBasedCreativeStrategist,
    SemanticAnalyzer, WeightedBudgetOptimizer,
};

/// Everything a successful run produced, stage by stage.
#[derive(Debug)]
pub struct PipelineRun {
    pub progress: PipelineProgress,
    pub extracted: ExtractedContent,
    pub semantic: SemanticAnalysis,
    pub audit: AuditResult,
    pub strategy: StrategyResult,
    pub audiences: Vec<AudienceResult>,
    pub placements: Vec<PlacementResult>,
    pub orchestration: CampaignOrchestrationResult,
}

/// A terminal stage failure, carrying the best-available partial progress.
#[derive(Debug)]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    pub error: PipelineError,
    pub progress: PipelineProgress,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pipeline failed at {}: {}", self.stage.as_str(), self.error)
    }
}

impl std::error::Error for PipelineFailure {}

/// The campaign-construction pipeline. One invocation is one independent
/// run; there is no shared state across runs.
pub struct CampaignPipeline {
    extractor: Arc<dyn ContentExtractor>,
    analyzer: Arc<dyn SemanticAnalyzer>,
    strategy_engine: StrategyEngine,
    audience_constructor: AudienceConstructor,
    creative_strategist: Arc<dyn CreativeStrategist>,
    budget_optimizer: Arc<dyn BudgetOptimizer>,
    progress_sink: Arc<dyn ProgressSink>,
    config: PipelineConfig,
}

impl CampaignPipeline {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        analyzer: Arc<dyn SemanticAnalyzer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            strategy_engine: StrategyEngine::new(config.strategy.clone()),
            audience_constructor: AudienceConstructor::new(config.audience.clone()),
            creative_strategist: Arc::new(RuleBasedCreativeStrategist),
            budget_optimizer: Arc::new(WeightedBudgetOptimizer::new(config.budget.clone())),
            progress_sink: noop_sink(),
            config,
        }
    }

    pub fn with_strategy_model(mut self, model: Arc<dyn StrategyModel>) -> Self {
        self.strategy_engine = StrategyEngine::new(self.config.strategy.clone()).with_model(model);
        self
    }

    pub fn with_interest_resolver(mut self, resolver: Arc<dyn InterestResolver>) -> Self {
        self.audience_constructor =
            AudienceConstructor::new(self.config.audience.clone()).with_resolver(resolver);
        self
    }

    pub fn with_creative_strategist(mut self, strategist: Arc<dyn CreativeStrategist>) -> Self {
        self.creative_strategist = strategist;
        self
    }

    pub fn with_budget_optimizer(mut self, optimizer: Arc<dyn BudgetOptimizer>) -> Self {
        self.budget_optimizer = optimizer;
        self
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = sink;
        self
    }

    /// Run the full pipeline for one campaign request.
    pub async fn run(
        &self,
        input: CampaignInput,
        account_data: RawAccountData,
        account_id: &str,
    ) -> Result<PipelineRun, PipelineFailure> {
        let run_id = Uuid::new_v4();
        let mut progress = PipelineProgress::new(run_id);
        info!(%run_id, account_id, url = %input.product_url, "pipeline run starting");

        // 1. Content extraction.
        let stage = PipelineStage::ContentExtraction;
        self.begin(&mut progress, stage);
        let extracted = match self.extractor.extract(&input.product_url).await {
            Ok(content) => content,
            Err(e) => return Err(self.fail(progress, stage, e)),
        };
        self.complete(
            &mut progress,
            stage,
            format!("extracted `{}`", extracted.title),
            BTreeMap::from([
                (
                    "text_blocks".to_string(),
                    serde_json::json!(extracted.text_blocks.len()),
                ),
                (
                    "images".to_string(),
                    serde_json::json!(extracted.images.len()),
                ),
            ]),
            Vec::new(),
        );

        // 2. Semantic analysis.
        let stage = PipelineStage::SemanticAnalysis;
        self.begin(&mut progress, stage);
        let semantic = match self.analyzer.analyze(&extracted).await {
            Ok(analysis) => analysis,
            Err(e) => return Err(self.fail(progress, stage, e)),
        };
        self.complete(
            &mut progress,
            stage,
            semantic.product_summary.clone(),
            BTreeMap::from([(
                "keywords".to_string(),
                serde_json::json!(semantic.keywords.len()),
            )]),
            Vec::new(),
        );

        // 3. Account audit — pure, cannot fail.
        let stage = PipelineStage::AccountAudit;
        self.begin(&mut progress, stage);
        let audit = adpilot_audit::audit(&account_data, &self.config.audit);
        self.complete(
            &mut progress,
            stage,
            format!("{:?} / pixel {:?}", audit.data_level, audit.pixel_health),
            BTreeMap::from([
                (
                    "data_level".to_string(),
                    serde_json::json!(audit.data_level),
                ),
                (
                    "usable_events".to_string(),
                    serde_json::json!(audit.usable_events),
                ),
            ]),
            audit.risks.clone(),
        );

        // 4. Strategy.
        let stage = PipelineStage::StrategyGeneration;
        self.begin(&mut progress, stage);
        let strategy = match self
            .strategy_engine
            .strategize(&audit, &semantic, input.business_goal, &input)
            .await
        {
            Ok(strategy) => strategy,
            Err(e) => return Err(self.fail(progress, stage, e)),
        };
        self.complete(
            &mut progress,
            stage,
            format!("{:?} with {} ad sets", strategy.approach, strategy.ad_sets.len()),
            BTreeMap::from([
                (
                    "objective".to_string(),
                    serde_json::json!(strategy.campaign_objective),
                ),
                (
                    "total_creatives".to_string(),
                    serde_json::json!(strategy.total_creatives()),
                ),
            ]),
            Vec::new(),
        );

        // 5. Audiences. ERROR audiences are carried along (and reported)
        // but never fail the stage.
        let stage = PipelineStage::AudienceConstruction;
        self.begin(&mut progress, stage);
        let requirements = AudienceRequirements {
            countries: self.target_countries(&input, &semantic),
            age_min: None,
            age_max: None,
            interest_combination: Default::default(),
        };
        let audiences = self
            .audience_constructor
            .construct_audiences(&strategy, &requirements)
            .await;
        let audience_warnings: Vec<String> = audiences
            .iter()
            .filter(|a| !a.usable())
            .flat_map(|a| {
                a.validation_messages
                    .iter()
                    .map(move |m| format!("audience `{}`: {m}", a.name))
            })
            .collect();
        self.complete(
            &mut progress,
            stage,
            format!(
                "{} audiences ({} unusable)",
                audiences.len(),
                audiences.iter().filter(|a| !a.usable()).count()
            ),
            BTreeMap::from([(
                "audiences".to_string(),
                serde_json::json!(audiences.len()),
            )]),
            audience_warnings,
        );

        // 6. Placements.
        let stage = PipelineStage::PlacementSelection;
        self.begin(&mut progress, stage);
        let placement_inputs: Vec<AdSetPlacementInput> = strategy
            .ad_sets
            .iter()
            .zip(&audiences)
            .map(|(ad_set, audience)| AdSetPlacementInput {
                name: ad_set.name.clone(),
                adset_type: ad_set.adset_type,
                estimated_max_reach: audience.estimated_reach.max,
            })
            .collect();
        let placements = determine_placements(&placement_inputs, &input.creative_assets);
        let placement_warnings: Vec<String> = placements
            .iter()
            .flat_map(|p| {
                p.warnings
                    .iter()
                    .filter(|w| w.severity >= WarningSeverity::Warning)
                    .map(move |w| format!("`{}`: {}", p.adset_name, w.message))
            })
            .collect();
        self.complete(
            &mut progress,
            stage,
            format!(
                "placements selected for {} ad sets",
                placements.len()
            ),
            BTreeMap::from([(
                "total_positions".to_string(),
                serde_json::json!(placements
                    .iter()
                    .map(|p| p.placements.total())
                    .sum::<usize>()),
            )]),
            placement_warnings,
        );

        // 7. Creatives. A failing custom strategist degrades to the
        // rule-based default rather than aborting.
        let stage = PipelineStage::CreativeGeneration;
        self.begin(&mut progress, stage);
        let mut creative_warnings = Vec::new();
        let mut creatives_per_adset: Vec<Vec<CreativeVariant>> = Vec::new();
        for ad_set in &strategy.ad_sets {
            let variants = match self.creative_strategist.variants(ad_set, &semantic).await {
                Ok(variants) => variants,
                Err(e) => {
                    warn!(error = %e, ad_set = %ad_set.name, "creative strategist failed; using rule-based variants");
                    creative_warnings.push(format!(
                        "`{}`: creative strategist failed ({e}); rule-based variants used",
                        ad_set.name
                    ));
                    RuleBasedCreativeStrategist
                        .variants(ad_set, &semantic)
                        .await
                        .unwrap_or_default()
                }
            };
            creatives_per_adset.push(variants);
        }
        self.complete(
            &mut progress,
            stage,
            format!(
                "{} creative variants",
                creatives_per_adset.iter().map(Vec::len).sum::<usize>()
            ),
            BTreeMap::new(),
            creative_warnings,
        );

        // 8. Budget allocation.
        let stage = PipelineStage::BudgetAllocation;
        self.begin(&mut progress, stage);
        if input.daily_budget <= 0.0 {
            return Err(self.fail(
                progress,
                stage,
                PipelineError::Budget(format!(
                    "daily budget must be positive, got {}",
                    input.daily_budget
                )),
            ));
        }
        let budgets = self
            .budget_optimizer
            .allocate(input.daily_budget, &strategy.ad_sets);
        self.complete(
            &mut progress,
            stage,
            format!("{:.2} {} split across {} ad sets", input.daily_budget, input.currency, budgets.len()),
            BTreeMap::new(),
            Vec::new(),
        );

        // 9. Orchestration.
        let stage = PipelineStage::Orchestration;
        self.begin(&mut progress, stage);
        let structure = self.assemble_structure(
            &input,
            &account_data,
            &extracted,
            &audit,
            &strategy,
            &audiences,
            &placements,
            &creatives_per_adset,
            &budgets,
            &mut progress,
        );
        let orchestration = match orchestrate(&structure, account_id, &self.config.orchestrator) {
            Ok(result) => result,
            Err(e) => return Err(self.fail(progress, stage, e)),
        };
        self.complete(
            &mut progress,
            stage,
            format!(
                "{} ad sets, {} creatives, {} ads",
                orchestration.ad_sets.len(),
                orchestration.creatives.len(),
                orchestration.ads.len()
            ),
            BTreeMap::from([(
                "risk_flags".to_string(),
                serde_json::json!(orchestration.risk_flags.len()),
            )]),
            Vec::new(),
        );

        progress.complete();
        self.progress_sink.publish(&progress);
        metrics::counter!("pipeline.runs_completed").increment(1);
        info!(%run_id, "pipeline run complete");

        Ok(PipelineRun {
            progress,
            extracted,
            semantic,
            audit,
            strategy,
            audiences,
            placements,
            orchestration,
        })
    }

    fn target_countries(&self, input: &CampaignInput, semantic: &SemanticAnalysis) -> Vec<String> {
        if !input.countries.is_empty() {
            return input.countries.clone();
        }
        if !semantic.geographic_analysis.primary_markets.is_empty() {
            return semantic.geographic_analysis.primary_markets.clone();
        }
        vec!["US".to_string()]
    }

    /// Join strategy, audiences, placements, budgets and creatives into the
    /// orchestrator's input, dropping ad sets whose audience failed
    /// validation.
    #[allow(clippy::too_many_arguments)]
    fn assemble_structure(
        &self,
        input: &CampaignInput,
        account_data: &RawAccountData,
        extracted: &ExtractedContent,
        audit: &AuditResult,
        strategy: &StrategyResult,
        audiences: &[AudienceResult],
        placements: &[PlacementResult],
        creatives_per_adset: &[Vec<CreativeVariant>],
        budgets: &[f64],
        progress: &mut PipelineProgress,
    ) -> CampaignStructure {
        let mut ad_sets = Vec::new();
        for (i, ad_set) in strategy.ad_sets.iter().enumerate() {
            let audience = &audiences[i];
            if !audience.usable() {
                progress.warnings.push(format!(
                    "ad set `{}` excluded from the campaign: audience failed validation",
                    ad_set.name
                ));
                continue;
            }
            ad_sets.push(AssembledAdSet {
                name: ad_set.name.clone(),
                adset_type: ad_set.adset_type,
                optimization_goal: ad_set.optimization_goal,
                bid_strategy: ad_set.bid_strategy,
                daily_budget: budgets.get(i).copied().unwrap_or(0.0),
                audience: audience.clone(),
                placements: placements[i].clone(),
                creatives: creatives_per_adset.get(i).cloned().unwrap_or_default(),
            });
        }

        let title = extracted.title.trim();
        let campaign_name = if title.is_empty() {
            "Product launch".to_string()
        } else {
            format!("{title} launch")
        };

        CampaignStructure {
            campaign_name,
            objective: strategy.campaign_objective,
            total_budget: input.total_budget,
            currency: input.currency.clone(),
            page_id: input.page_id.clone(),
            pixel_id: input
                .pixel_id
                .clone()
                .or_else(|| account_data.pixels.first().map(|p| p.id.clone())),
            instagram_actor_id: input.instagram_actor_id.clone(),
            destination_url: input.destination().to_string(),
            pixel_health: audit.pixel_health,
            ad_sets,
        }
    }

    fn begin(&self, progress: &mut PipelineProgress, stage: PipelineStage) {
        progress.begin_stage(stage);
        self.progress_sink.publish(progress);
    }

    fn complete(
        &self,
        progress: &mut PipelineProgress,
        stage: PipelineStage,
        detail: String,
        stage_metrics: BTreeMap<String, serde_json::Value>,
        warnings: Vec<String>,
    ) {
        metrics::counter!("pipeline.stages_completed", "stage" => stage.as_str()).increment(1);
        progress.complete_stage(stage, detail, stage_metrics, warnings);
        self.progress_sink.publish(progress);
    }

    fn fail(
        &self,
        mut progress: PipelineProgress,
        stage: PipelineStage,
        error: PipelineError,
    ) -> PipelineFailure {
        metrics::counter!("pipeline.stage_failures", "stage" => stage.as_str()).increment(1);
        warn!(stage = stage.as_str(), error = %error, "pipeline stage failed");
        progress.fail_stage(stage, error.to_string());
        self.progress_sink.publish(&progress);
        PipelineFailure {
            stage,
            error,
            progress,
        }
    }
}
