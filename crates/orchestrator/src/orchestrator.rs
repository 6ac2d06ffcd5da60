//! Campaign orchestrator — assembles audited, strategized, targeted and
//! budgeted parts into the final hierarchical API payload set, with an
//! ordered execution plan, a validation checklist, risk flags, support
//! hooks and a rollback plan.
//!
//! Pure transformation: no network calls, no partial-write semantics.

use tracing::info;

use adpilot_audit::PixelHealth;
use adpilot_core::config::OrchestratorConfig;
use adpilot_core::error::{PipelineError, PipelineResult};

use crate::payloads::{
    build_ad_payload, build_adset_payload, build_campaign_payload, build_creative_payload,
};
use crate::types::{
    ApiPayload, CampaignOrchestrationResult, CampaignStructure, ChecklistItem, ExecutionStep,
    RequirementLevel, RiskFlag, RiskSeverity, RollbackStep, SupportHook,
};

/// Assemble the API-ready campaign package for an account.
pub fn orchestrate(
    structure: &CampaignStructure,
    account_id: &str,
    config: &OrchestratorConfig,
) -> PipelineResult<CampaignOrchestrationResult> {
    validate_structure(structure)?;

    let campaign = build_campaign_payload(structure, account_id);

    let mut ad_sets: Vec<ApiPayload> = Vec::new();
    let mut creatives: Vec<ApiPayload> = Vec::new();
    let mut ads: Vec<ApiPayload> = Vec::new();
    let mut creative_index = 0usize;

    for (adset_index, ad_set) in structure.ad_sets.iter().enumerate() {
        ad_sets.push(build_adset_payload(adset_index, ad_set, structure, account_id));
        for variant in &ad_set.creatives {
            creatives.push(build_creative_payload(
                creative_index,
                ad_set,
                variant,
                structure,
                account_id,
                config,
            ));
            ads.push(build_ad_payload(
                adset_index,
                creative_index,
                ad_set,
                structure,
                account_id,
            ));
            creative_index += 1;
        }
    }

    let result = CampaignOrchestrationResult {
        account_id: account_id.to_string(),
        campaign,
        ad_sets,
        creatives,
        ads,
        execution_plan: execution_plan(),
        validation_checklist: validation_checklist(),
        risk_flags: derive_risk_flags(structure, config),
        support_hooks: support_hooks(),
        rollback_plan: rollback_plan(),
    };

    info!(
        ad_sets = result.ad_sets.len(),
        creatives = result.creatives.len(),
        ads = result.ads.len(),
        risks = result.risk_flags.len(),
        "campaign orchestration assembled"
    );
    Ok(result)
}

fn validate_structure(structure: &CampaignStructure) -> PipelineResult<()> {
    if structure.ad_sets.is_empty() {
        return Err(PipelineError::Orchestration(
            "campaign structure has no ad sets".to_string(),
        ));
    }
    if structure.total_budget <= 0.0 {
        return Err(PipelineError::Orchestration(format!(
            "total budget must be positive, got {}",
            structure.total_budget
        )));
    }
    if structure.campaign_name.trim().is_empty() {
        return Err(PipelineError::Orchestration(
            "campaign name is empty".to_string(),
        ));
    }
    if structure.destination_url.trim().is_empty() {
        return Err(PipelineError::Orchestration(
            "destination URL is empty".to_string(),
        ));
    }
    Ok(())
}

/// The fixed six-step deployment order. Everything is created PAUSED; the
/// final step is a human decision.
fn execution_plan() -> Vec<ExecutionStep> {
    vec![
        ExecutionStep {
            order: 1,
            name: "create_campaign".to_string(),
            description: "POST the campaign payload; record the returned id as {{CAMPAIGN_ID}}"
                .to_string(),
            success_criteria: "campaign id returned and status is PAUSED".to_string(),
            on_error: "support:campaign_create_failed".to_string(),
        },
        ExecutionStep {
            order: 2,
            name: "create_ad_sets".to_string(),
            description: "POST each ad-set payload with {{CAMPAIGN_ID}} resolved; record \
                          {{ADSET_n_ID}} per ad set"
                .to_string(),
            success_criteria: "every ad set created with matching daily budget".to_string(),
            on_error: "support:adset_create_failed".to_string(),
        },
        ExecutionStep {
            order: 3,
            name: "create_creatives".to_string(),
            description: "POST each creative payload; record {{CREATIVE_n_ID}} per creative"
                .to_string(),
            success_criteria: "every creative accepted without policy rejection".to_string(),
            on_error: "support:creative_rejected".to_string(),
        },
        ExecutionStep {
            order: 4,
            name: "create_ads".to_string(),
            description: "POST each ad payload with ad-set and creative tokens resolved"
                .to_string(),
            success_criteria: "every ad created and linked".to_string(),
            on_error: "support:ad_create_failed".to_string(),
        },
        ExecutionStep {
            order: 5,
            name: "validate".to_string(),
            description: "Run the validation checklist against the created objects".to_string(),
            success_criteria: "all REQUIRED checklist items pass".to_string(),
            on_error: "support:validation_failed".to_string(),
        },
        ExecutionStep {
            order: 6,
            name: "manual_enable".to_string(),
            description: "Human review, then flip campaign status to ACTIVE".to_string(),
            success_criteria: "campaign delivering".to_string(),
            on_error: "support:delivery_stalled".to_string(),
        },
    ]
}

/// Pre-deployment requirements, tagged by how hard they block launch.
fn validation_checklist() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem {
            requirement: "pixel_installed".to_string(),
            level: RequirementLevel::Required,
            description: "Pixel fires on the landing page and reports events".to_string(),
        },
        ChecklistItem {
            requirement: "page_connected".to_string(),
            level: RequirementLevel::Required,
            description: "Facebook page is connected to the ad account".to_string(),
        },
        ChecklistItem {
            requirement: "payment_valid".to_string(),
            level: RequirementLevel::Required,
            description: "Payment method is valid and not near its limit".to_string(),
        },
        ChecklistItem {
            requirement: "domain_verified".to_string(),
            level: RequirementLevel::Required,
            description: "Landing domain is verified in Business Manager".to_string(),
        },
        ChecklistItem {
            requirement: "creative_approved".to_string(),
            level: RequirementLevel::Recommended,
            description: "Creatives reviewed against ad policies before submission".to_string(),
        },
        ChecklistItem {
            requirement: "landing_page_compliant".to_string(),
            level: RequirementLevel::Recommended,
            description: "Landing page matches the creative's claims".to_string(),
        },
        ChecklistItem {
            requirement: "audience_overlap_reviewed".to_string(),
            level: RequirementLevel::Optional,
            description: "Overlap warnings reviewed; budgets adjusted if competing".to_string(),
        },
    ]
}

/// Risks derived from the assembled structure. These are pre-declared
/// triggers for the execution layer, not blockers.
fn derive_risk_flags(structure: &CampaignStructure, config: &OrchestratorConfig) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    for ad_set in &structure.ad_sets {
        if ad_set.daily_budget < config.low_budget_threshold {
            flags.push(RiskFlag {
                severity: RiskSeverity::High,
                category: "budget".to_string(),
                message: format!(
                    "`{}` daily budget {:.2} is below {:.2}; the learning phase may never \
                     complete",
                    ad_set.name, ad_set.daily_budget, config.low_budget_threshold
                ),
            });
        }
        if ad_set.audience.estimated_reach.max < 1000 {
            flags.push(RiskFlag {
                severity: RiskSeverity::High,
                category: "audience".to_string(),
                message: format!(
                    "`{}` estimated reach is under 1000; delivery will be unreliable",
                    ad_set.name
                ),
            });
        }
        if ad_set.creatives.len() < config.min_creatives_per_adset {
            flags.push(RiskFlag {
                severity: RiskSeverity::Low,
                category: "creative".to_string(),
                message: format!(
                    "`{}` has {} creative(s); fewer than {} limits optimization",
                    ad_set.name,
                    ad_set.creatives.len(),
                    config.min_creatives_per_adset
                ),
            });
        }
    }

    if structure.pixel_id.is_none() || structure.pixel_health == PixelHealth::None {
        flags.push(RiskFlag {
            severity: RiskSeverity::Medium,
            category: "tracking".to_string(),
            message: "No healthy pixel — conversion optimization and reporting will be blind"
                .to_string(),
        });
    }

    flags
}

fn support_hooks() -> Vec<SupportHook> {
    vec![
        SupportHook {
            id: "support:campaign_create_failed".to_string(),
            trigger: "campaign creation rejected by the API".to_string(),
            action: "Check account spending limits and ODAX objective availability, then retry"
                .to_string(),
        },
        SupportHook {
            id: "support:adset_create_failed".to_string(),
            trigger: "ad-set creation rejected".to_string(),
            action: "Verify referenced audiences exist and placement fields are top-level"
                .to_string(),
        },
        SupportHook {
            id: "support:creative_rejected".to_string(),
            trigger: "creative failed policy review".to_string(),
            action: "Revise flagged text or imagery and resubmit; do not appeal first".to_string(),
        },
        SupportHook {
            id: "support:ad_create_failed".to_string(),
            trigger: "ad creation failed".to_string(),
            action: "Confirm ad-set and creative ids resolved; recreate missing objects"
                .to_string(),
        },
        SupportHook {
            id: "support:validation_failed".to_string(),
            trigger: "a REQUIRED checklist item failed".to_string(),
            action: "Resolve the checklist item before enabling the campaign".to_string(),
        },
        SupportHook {
            id: "support:delivery_stalled".to_string(),
            trigger: "campaign enabled but not spending".to_string(),
            action: "Review audience sizes, bids and creative approval status".to_string(),
        },
    ]
}

/// Conditional remediation steps the execution layer applies without
/// further consultation.
fn rollback_plan() -> Vec<RollbackStep> {
    vec![
        RollbackStep {
            trigger: "spend exceeds 2× daily budget with zero conversions, or a policy \
                      violation is raised"
                .to_string(),
            action: "Pause the campaign".to_string(),
        },
        RollbackStep {
            trigger: "an ad set's CPA exceeds 3× the target for a full day".to_string(),
            action: "Pause that ad set".to_string(),
        },
        RollbackStep {
            trigger: "a creative's CTR stays below 0.5% for 48 hours".to_string(),
            action: "Archive that creative".to_string(),
        },
        RollbackStep {
            trigger: "performance degrades after a budget increase".to_string(),
            action: "Revert the budget to its previous value".to_string(),
        },
    ]
}
