use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// Root pipeline configuration. Loaded from environment variables with the
/// prefix `ADPILOT__` and an optional `adpilot.toml` config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub audience: AudienceConfig,
    #[serde(default)]
    pub interest_service: InterestServiceConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl PipelineConfig {
    /// Load configuration from `adpilot.toml` (optional) and `ADPILOT__*`
    /// environment variables.
    pub fn load() -> PipelineResult<Self> {
        config::Config::builder()
            .add_source(config::File::with_name("adpilot").required(false))
            .add_source(config::Environment::with_prefix("ADPILOT").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}

/// Account audit thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Insight lookback window in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Assumed average order value used to estimate ROAS when the account
    /// reports no real revenue signal. An approximation, not a guarantee —
    /// replace with a real business input where one exists.
    #[serde(default = "default_assumed_order_value")]
    pub assumed_order_value: f64,
    /// Total pixel events above which pixel health is RICH.
    #[serde(default = "default_rich_pixel_events")]
    pub rich_pixel_events: u64,
    /// Total pixel events above which pixel health is BASIC.
    #[serde(default = "default_basic_pixel_events")]
    pub basic_pixel_events: u64,
    #[serde(default = "default_rich_min_conversions")]
    pub rich_min_conversions: f64,
    #[serde(default = "default_rich_min_roas")]
    pub rich_min_roas: f64,
    #[serde(default = "default_low_min_conversions")]
    pub low_min_conversions: f64,
    #[serde(default = "default_low_min_spend")]
    pub low_min_spend: f64,
    #[serde(default = "default_low_min_events")]
    pub low_min_events: u64,
    /// CTR below this fraction is flagged as a risk.
    #[serde(default = "default_low_ctr_threshold")]
    pub low_ctr_threshold: f64,
    /// Average CPA above this is flagged as a risk.
    #[serde(default = "default_high_cpa_threshold")]
    pub high_cpa_threshold: f64,
}

/// Strategy engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Global cap on planned creative variants across all ad sets.
    #[serde(default = "default_max_total_creatives")]
    pub max_total_creatives: u32,
    /// Time bound on a single strategy-model call.
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

/// Audience construction bounds and reach-discount factors.
#[derive(Debug, Clone, Deserialize)]
pub struct AudienceConfig {
    /// Estimated max reach below this is an ERROR (too small to deliver).
    #[serde(default = "default_min_viable_reach")]
    pub min_viable_reach: u64,
    /// Estimated min reach above this is a learning-phase WARNING.
    #[serde(default = "default_max_learning_reach")]
    pub max_learning_reach: u64,
    /// Reach multiplier when interest specs are present.
    #[serde(default = "default_interest_discount")]
    pub interest_discount: f64,
    /// Reach multiplier when custom-audience references are present.
    #[serde(default = "default_custom_audience_discount")]
    pub custom_audience_discount: f64,
    /// Reach multiplier when exclusions are present.
    #[serde(default = "default_exclusion_discount")]
    pub exclusion_discount: f64,
    #[serde(default = "default_age_min")]
    pub default_age_min: u8,
    #[serde(default = "default_age_max")]
    pub default_age_max: u8,
    /// Default retargeting day-window when the strategy omits one.
    #[serde(default = "default_retargeting_days")]
    pub default_retargeting_days: u32,
    /// Recent-purchaser exclusion window for retargeting ad sets.
    #[serde(default = "default_purchaser_exclusion_days")]
    pub purchaser_exclusion_days: u32,
}

/// Graph API interest-search service.
#[derive(Debug, Clone, Deserialize)]
pub struct InterestServiceConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_interest_timeout_ms")]
    pub timeout_ms: u64,
}

/// Budget allocation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Floor for any single ad set's daily budget, in major currency units.
    #[serde(default = "default_min_daily_budget")]
    pub min_daily_budget: f64,
}

/// Orchestrator risk thresholds and tracking defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-ad-set daily budget below this is a HIGH risk (learning phase
    /// may never complete).
    #[serde(default = "default_low_budget_threshold")]
    pub low_budget_threshold: f64,
    /// Ad sets with fewer creatives than this are a LOW risk.
    #[serde(default = "default_min_creatives_per_adset")]
    pub min_creatives_per_adset: usize,
    /// `utm_source` value stamped on creative destination links.
    #[serde(default = "default_tracking_source")]
    pub tracking_source: String,
}

// Default functions
fn default_lookback_days() -> u32 {
    90
}
fn default_assumed_order_value() -> f64 {
    50.0
}
fn default_rich_pixel_events() -> u64 {
    1000
}
fn default_basic_pixel_events() -> u64 {
    100
}
fn default_rich_min_conversions() -> f64 {
    50.0
}
fn default_rich_min_roas() -> f64 {
    1.5
}
fn default_low_min_conversions() -> f64 {
    10.0
}
fn default_low_min_spend() -> f64 {
    1000.0
}
fn default_low_min_events() -> u64 {
    500
}
fn default_low_ctr_threshold() -> f64 {
    0.01
}
fn default_high_cpa_threshold() -> f64 {
    50.0
}
fn default_max_total_creatives() -> u32 {
    5
}
fn default_model_timeout_secs() -> u64 {
    30
}
fn default_min_viable_reach() -> u64 {
    1000
}
fn default_max_learning_reach() -> u64 {
    100_000_000
}
fn default_interest_discount() -> f64 {
    0.3
}
fn default_custom_audience_discount() -> f64 {
    0.1
}
fn default_exclusion_discount() -> f64 {
    0.9
}
fn default_age_min() -> u8 {
    18
}
fn default_age_max() -> u8 {
    65
}
fn default_retargeting_days() -> u32 {
    30
}
fn default_purchaser_exclusion_days() -> u32 {
    7
}
fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}
fn default_interest_timeout_ms() -> u64 {
    5000
}
fn default_min_daily_budget() -> f64 {
    5.0
}
fn default_low_budget_threshold() -> f64 {
    20.0
}
fn default_min_creatives_per_adset() -> usize {
    3
}
fn default_tracking_source() -> String {
    "adpilot".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            assumed_order_value: default_assumed_order_value(),
            rich_pixel_events: default_rich_pixel_events(),
            basic_pixel_events: default_basic_pixel_events(),
            rich_min_conversions: default_rich_min_conversions(),
            rich_min_roas: default_rich_min_roas(),
            low_min_conversions: default_low_min_conversions(),
            low_min_spend: default_low_min_spend(),
            low_min_events: default_low_min_events(),
            low_ctr_threshold: default_low_ctr_threshold(),
            high_cpa_threshold: default_high_cpa_threshold(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_total_creatives: default_max_total_creatives(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl Default for AudienceConfig {
    fn default() -> Self {
        Self {
            min_viable_reach: default_min_viable_reach(),
            max_learning_reach: default_max_learning_reach(),
            interest_discount: default_interest_discount(),
            custom_audience_discount: default_custom_audience_discount(),
            exclusion_discount: default_exclusion_discount(),
            default_age_min: default_age_min(),
            default_age_max: default_age_max(),
            default_retargeting_days: default_retargeting_days(),
            purchaser_exclusion_days: default_purchaser_exclusion_days(),
        }
    }
}

impl Default for InterestServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            timeout_ms: default_interest_timeout_ms(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_daily_budget: default_min_daily_budget(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            low_budget_threshold: default_low_budget_threshold(),
            min_creatives_per_adset: default_min_creatives_per_adset(),
            tracking_source: default_tracking_source(),
        }
    }
}
