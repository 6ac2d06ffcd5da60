use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Lenient numeric parsing ────────────────────────────────────────────
//
// The Graph API reports most insight metrics as strings ("123.45"). These
// helpers accept a number or a numeric string and fall back to zero on
// anything malformed, so a partial insights payload never fails the audit.

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).max(0.0) as u64)
}

pub fn value_as_f64(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// ─── Raw account data (uninterpreted platform export) ───────────────────

/// Raw advertising-account data as returned by the platform. All arrays are
/// optional — a cold account legitimately has none of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAccountData {
    #[serde(default)]
    pub insights: Vec<InsightRow>,
    #[serde(default)]
    pub pixels: Vec<Pixel>,
    #[serde(default)]
    pub custom_audiences: Vec<AudienceRef>,
    #[serde(default)]
    pub lookalike_audiences: Vec<AudienceRef>,
    #[serde(default)]
    pub campaigns: Vec<ExistingCampaign>,
}

/// One row of account insights over the lookback window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightRow {
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_stop: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spend: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub clicks: u64,
    /// Attributed conversions — fractional under some attribution models.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub conversions: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub events: Vec<PixelEventCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixelEventCount {
    /// Event name, e.g. "Purchase", "AddToCart", "Lead".
    pub event: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudienceRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub approximate_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExistingCampaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

// ─── Content extraction contract ────────────────────────────────────────

/// Structured output of the content-extraction collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: String,
    #[serde(default)]
    pub text_blocks: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub structured_content: StructuredContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredContent {
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub lists: Vec<Vec<String>>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub product_info: ProductInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub testimonials: Vec<String>,
}

// ─── Semantic analysis contract ─────────────────────────────────────────

/// Schema-typed output of the LLM-backed semantic analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub product_summary: String,
    #[serde(default)]
    pub value_proposition: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub competitor_analysis: CompetitorAnalysis,
    #[serde(default)]
    pub geographic_analysis: GeographicAnalysis,
    #[serde(default)]
    pub target_segments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub positioning: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeographicAnalysis {
    /// ISO country codes of the strongest markets, best first.
    #[serde(default)]
    pub primary_markets: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

// ─── Campaign input ─────────────────────────────────────────────────────

/// What the user asks for: a product, a goal, a budget and the account
/// identifiers the payloads will reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignInput {
    pub product_url: String,
    pub business_goal: BusinessGoal,
    /// Lifetime budget in major currency units; becomes the spend cap.
    pub total_budget: f64,
    /// Daily budget in major currency units, split across ad sets.
    pub daily_budget: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub page_id: String,
    #[serde(default)]
    pub pixel_id: Option<String>,
    #[serde(default)]
    pub instagram_actor_id: Option<String>,
    /// Landing page for all creatives; defaults to the product URL.
    #[serde(default)]
    pub destination_url: Option<String>,
    /// Target countries (ISO codes). Empty means "use the geographic
    /// analysis".
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub creative_assets: Vec<CreativeAsset>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CampaignInput {
    pub fn destination(&self) -> &str {
        self.destination_url.as_deref().unwrap_or(&self.product_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BusinessGoal {
    Sales,
    Leads,
    Traffic,
    Awareness,
    Engagement,
    AppPromotion,
}

/// Closed ODAX objective set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignObjective {
    OutcomeSales,
    OutcomeLeads,
    OutcomeTraffic,
    OutcomeAwareness,
    OutcomeEngagement,
    OutcomeAppPromotion,
}

impl CampaignObjective {
    pub fn for_goal(goal: BusinessGoal) -> Self {
        match goal {
            BusinessGoal::Sales => Self::OutcomeSales,
            BusinessGoal::Leads => Self::OutcomeLeads,
            BusinessGoal::Traffic => Self::OutcomeTraffic,
            BusinessGoal::Awareness => Self::OutcomeAwareness,
            BusinessGoal::Engagement => Self::OutcomeEngagement,
            BusinessGoal::AppPromotion => Self::OutcomeAppPromotion,
        }
    }
}

// ─── Creative assets and variants ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
    Carousel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 1:1
    Square,
    /// 1.91:1
    Landscape,
    /// 4:5
    Portrait,
    /// 9:16
    Vertical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeAsset {
    pub url: String,
    pub kind: AssetKind,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub duration_secs: Option<f32>,
}

/// One headline/body/CTA combination produced by the creative strategist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeVariant {
    pub headline: String,
    pub body: String,
    pub call_to_action: CallToActionType,
    #[serde(default)]
    pub asset_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallToActionType {
    ShopNow,
    LearnMore,
    SignUp,
    Subscribe,
    GetOffer,
    DownloadApp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parsing_accepts_strings_and_numbers() {
        let row: InsightRow = serde_json::from_value(serde_json::json!({
            "spend": "123.45",
            "impressions": 9000,
            "clicks": "37",
            "conversions": "2.5"
        }))
        .unwrap();
        assert!((row.spend - 123.45).abs() < f64::EPSILON);
        assert_eq!(row.impressions, 9000);
        assert_eq!(row.clicks, 37);
        assert!((row.conversions - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lenient_parsing_defaults_to_zero() {
        let row: InsightRow = serde_json::from_value(serde_json::json!({
            "spend": "not-a-number",
            "clicks": null
        }))
        .unwrap();
        assert_eq!(row.spend, 0.0);
        assert_eq!(row.clicks, 0);
        assert_eq!(row.impressions, 0);
    }

    #[test]
    fn test_objective_serializes_as_odax_string() {
        let json = serde_json::to_string(&CampaignObjective::OutcomeSales).unwrap();
        assert_eq!(json, "\"OUTCOME_SALES\"");
    }

    #[test]
    fn test_account_data_tolerates_empty_payload() {
        let data: RawAccountData = serde_json::from_str("{}").unwrap();
        assert!(data.insights.is_empty());
        assert!(data.pixels.is_empty());
    }
}
