//! Strategy-model seam: capability trait, prompt construction and reply
//! parsing. The model is a black box returning JSON per the
//! [`StrategyResult`] schema; everything probabilistic stays behind the
//! trait so the engine can always fall back to the rule-based path.

use async_trait::async_trait;

use adpilot_audit::AuditResult;
use adpilot_core::error::{PipelineError, PipelineResult};
use adpilot_core::types::{BusinessGoal, CampaignInput, SemanticAnalysis};

use crate::types::StrategyResult;

/// Capability interface for the strategy model. Implementations wrap an LLM
/// provider; tests use canned replies.
#[async_trait]
pub trait StrategyModel: Send + Sync {
    /// Generate a raw reply for the given prompt. The reply is expected to
    /// be JSON matching the strategy schema, possibly wrapped in markdown
    /// fences.
    async fn generate_strategy(&self, prompt: &str) -> PipelineResult<String>;
}

const STRATEGY_PREAMBLE: &str = "\
You are a Meta advertising strategist. Given an account audit and a product \
analysis, produce a campaign strategy as JSON. You MUST respond with valid \
JSON only — no markdown fences, no explanations. The campaign_objective and \
every enumerated field must use exactly the values allowed by the schema.";

/// Build the strategy prompt: audit summary, semantic analysis, the business
/// goal and the JSON schema the reply must satisfy.
pub fn build_strategy_prompt(
    audit: &AuditResult,
    semantic: &SemanticAnalysis,
    goal: BusinessGoal,
    input: &CampaignInput,
) -> String {
    let schema = schemars::schema_for!(StrategyResult);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        "{preamble}\n\n\
         ACCOUNT AUDIT:\n\
         - data level: {data_level:?}\n\
         - pixel health: {pixel_health:?}\n\
         - usable pixel events: {events}\n\
         - spend: {spend:.2}, conversions: {conversions:.1}, CTR: {ctr:.4}, avg CPA: {cpa:.2}\n\
         - custom audiences: {custom}, lookalikes: {lookalike}\n\
         - recommended approach: {approach:?}\n\n\
         PRODUCT:\n\
         - summary: {summary}\n\
         - value proposition: {value_prop}\n\
         - keywords: {keywords}\n\
         - target segments: {segments}\n\n\
         BUSINESS GOAL: {goal:?}\n\
         DAILY BUDGET: {daily:.2} {currency}\n\n\
         OUTPUT SCHEMA (return exactly this structure):\n{schema}",
        preamble = STRATEGY_PREAMBLE,
        data_level = audit.data_level,
        pixel_health = audit.pixel_health,
        events = audit.usable_events,
        spend = audit.account_summary.spend,
        conversions = audit.account_summary.conversions,
        ctr = audit.account_summary.ctr,
        cpa = audit.account_summary.avg_cpa,
        custom = audit.account_summary.custom_audience_count,
        lookalike = audit.account_summary.lookalike_audience_count,
        approach = audit.recommendations.approach,
        summary = semantic.product_summary,
        value_prop = semantic.value_proposition,
        keywords = semantic.keywords.join(", "),
        segments = semantic.target_segments.join(", "),
        goal = goal,
        daily = input.daily_budget,
        currency = input.currency,
        schema = schema_json,
    )
}

/// Strip markdown code fences from a model reply.
pub fn strip_code_blocks(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse and schema-validate a model reply. Enum fields outside the closed
/// sets fail here, which routes the engine to the fallback path.
pub fn parse_strategy_reply(raw: &str) -> PipelineResult<StrategyResult> {
    let cleaned = strip_code_blocks(raw);
    serde_json::from_str(cleaned)
        .map_err(|e| PipelineError::Model(format!("strategy reply failed validation: {e}")))
}
