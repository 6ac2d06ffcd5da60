//! Orchestrator input and output types. Payload bodies are explicit tagged
//! unions — every field the Graph API sees is a typed struct field, never a
//! loosely-typed JSON tree.

use serde::{Deserialize, Serialize};

use adpilot_audience::{AudienceResult, Targeting};
use adpilot_audit::PixelHealth;
use adpilot_core::types::{CampaignObjective, CreativeVariant};
use adpilot_placement::PlacementResult;
use adpilot_strategy::{AdSetType, BidStrategy, OptimizationGoal};

// ─── Orchestrator input ─────────────────────────────────────────────────

/// One fully-assembled ad set: strategy, audience, placements, budget and
/// creatives, joined by the pipeline driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledAdSet {
    pub name: String,
    pub adset_type: AdSetType,
    pub optimization_goal: OptimizationGoal,
    pub bid_strategy: BidStrategy,
    /// Daily budget in major currency units.
    pub daily_budget: f64,
    pub audience: AudienceResult,
    pub placements: PlacementResult,
    pub creatives: Vec<CreativeVariant>,
}

/// Everything the orchestrator needs to emit API-ready payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignStructure {
    pub campaign_name: String,
    pub objective: CampaignObjective,
    /// Lifetime budget in major currency units; becomes the spend cap.
    pub total_budget: f64,
    pub currency: String,
    pub page_id: String,
    #[serde(default)]
    pub pixel_id: Option<String>,
    #[serde(default)]
    pub instagram_actor_id: Option<String>,
    pub destination_url: String,
    pub pixel_health: PixelHealth,
    pub ad_sets: Vec<AssembledAdSet>,
}

// ─── Graph API payload bodies ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Paused,
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingEvent {
    Impressions,
    LinkClicks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationType {
    Website,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomEventType {
    Purchase,
    Lead,
    CompleteRegistration,
    AddToCart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignPayload {
    pub name: String,
    pub objective: CampaignObjective,
    /// Always PAUSED — campaigns are never auto-activated.
    pub status: EntityStatus,
    pub special_ad_categories: Vec<String>,
    pub buying_type: String,
    /// Spend cap in integer minor currency units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend_cap: Option<i64>,
}

/// Pixel conversion target for conversion-style optimization goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotedObject {
    pub pixel_id: String,
    pub custom_event_type: CustomEventType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionSpec {
    pub event_type: String,
    pub window_days: u32,
}

/// Ad-set payload. Placement position lists are top-level ad-set fields —
/// the Graph API rejects them nested inside `targeting`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSetPayload {
    pub name: String,
    pub campaign_id: String,
    pub status: EntityStatus,
    /// Daily budget in integer minor currency units.
    pub daily_budget: i64,
    pub billing_event: BillingEvent,
    pub optimization_goal: OptimizationGoal,
    pub bid_strategy: BidStrategy,
    pub destination_type: DestinationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_object: Option<PromotedObject>,
    pub targeting: Targeting,
    pub publisher_platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facebook_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instagram_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_network_positions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messenger_positions: Vec<String>,
    pub attribution_spec: Vec<AttributionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtaValue {
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToAction {
    #[serde(rename = "type")]
    pub cta_type: adpilot_core::types::CallToActionType,
    pub value: CtaValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkData {
    /// Destination URL with tracking parameters applied.
    pub link: String,
    /// Body text.
    pub message: String,
    /// Headline.
    pub name: String,
    pub call_to_action: CallToAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorySpec {
    pub page_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_actor_id: Option<String>,
    pub link_data: LinkData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardEnhancements {
    pub enroll_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeFeaturesSpec {
    pub standard_enhancements: StandardEnhancements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreesOfFreedomSpec {
    pub creative_features_spec: CreativeFeaturesSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativePayload {
    pub name: String,
    pub object_story_spec: ObjectStorySpec,
    /// Opts the creative into automatic enhancements.
    pub degrees_of_freedom_spec: DegreesOfFreedomSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdCreativeRef {
    pub creative_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdTrackingSpec {
    #[serde(rename = "action.type")]
    pub action_type: Vec<String>,
    pub fb_pixel: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdPayload {
    pub name: String,
    pub adset_id: String,
    pub creative: AdCreativeRef,
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracking_specs: Vec<AdTrackingSpec>,
}

/// Tagged union of everything the execution layer can POST.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadBody {
    Campaign(CampaignPayload),
    AdSet(AdSetPayload),
    Creative(CreativePayload),
    Ad(AdPayload),
}

/// One API call: endpoint, method, typed body, the placeholder tokens it
/// depends on and the pre-flight rules the execution layer should assert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPayload {
    pub endpoint: String,
    pub method: HttpMethod,
    pub payload: PayloadBody,
    pub dependencies: Vec<String>,
    pub validation_rules: Vec<String>,
}

// ─── Plan, checklist, risk, rollback ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub order: u8,
    pub name: String,
    pub description: String,
    pub success_criteria: String,
    /// Pointer into the support hooks on failure.
    pub on_error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementLevel {
    Required,
    Recommended,
    Optional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub requirement: String,
    pub level: RequirementLevel,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFlag {
    pub severity: RiskSeverity,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportHook {
    pub id: String,
    pub trigger: String,
    pub action: String,
}

/// Pre-declared remediation: condition → action, consumed by the execution
/// layer instead of ad-hoc handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackStep {
    pub trigger: String,
    pub action: String,
}

/// The complete, API-ready campaign package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignOrchestrationResult {
    pub account_id: String,
    pub campaign: ApiPayload,
    pub ad_sets: Vec<ApiPayload>,
    pub creatives: Vec<ApiPayload>,
    pub ads: Vec<ApiPayload>,
    pub execution_plan: Vec<ExecutionStep>,
    pub validation_checklist: Vec<ChecklistItem>,
    pub risk_flags: Vec<RiskFlag>,
    pub support_hooks: Vec<SupportHook>,
    pub rollback_plan: Vec<RollbackStep>,
}
