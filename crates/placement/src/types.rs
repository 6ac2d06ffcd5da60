use serde::{Deserialize, Serialize};

use adpilot_strategy::MetricRange;

// Platform position identifiers, as the Graph API spells them.
pub const FB_FEED: &str = "feed";
pub const FB_STORY: &str = "story";
pub const FB_RIGHT_HAND_COLUMN: &str = "right_hand_column";
pub const IG_FEED: &str = "stream";
pub const IG_STORY: &str = "story";
pub const IG_REELS: &str = "reels";
pub const AN_CLASSIC: &str = "classic";
pub const MESSENGER_HOME: &str = "messenger_home";

/// Selected positions per publisher platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementSet {
    pub facebook_positions: Vec<String>,
    pub instagram_positions: Vec<String>,
    pub audience_network_positions: Vec<String>,
    pub messenger_positions: Vec<String>,
}

impl PlacementSet {
    pub fn total(&self) -> usize {
        self.facebook_positions.len()
            + self.instagram_positions.len()
            + self.audience_network_positions.len()
            + self.messenger_positions.len()
    }

    /// Publisher platforms with at least one selected position.
    pub fn publisher_platforms(&self) -> Vec<String> {
        let mut platforms = Vec::new();
        if !self.facebook_positions.is_empty() {
            platforms.push("facebook".to_string());
        }
        if !self.instagram_positions.is_empty() {
            platforms.push("instagram".to_string());
        }
        if !self.audience_network_positions.is_empty() {
            platforms.push("audience_network".to_string());
        }
        if !self.messenger_positions.is_empty() {
            platforms.push("messenger".to_string());
        }
        platforms
    }
}

/// Format spec required by an aspect-ratio-bound placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeRequirement {
    pub placement: String,
    /// "image" or "video".
    pub format: String,
    /// e.g. "9:16".
    pub aspect_ratio: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumePotential {
    Low,
    Medium,
    High,
}

/// Advisory per-placement performance range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceExpectation {
    pub placement: String,
    /// CTR range as fractions.
    pub ctr: MetricRange,
    /// CPM range in major currency units.
    pub cpm: MetricRange,
    pub volume_potential: VolumePotential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementWarning {
    pub severity: WarningSeverity,
    pub message: String,
}

/// Per-ad-set placement decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementResult {
    pub adset_name: String,
    pub placements: PlacementSet,
    pub creative_requirements: Vec<CreativeRequirement>,
    pub performance_expectations: Vec<PerformanceExpectation>,
    pub warnings: Vec<PlacementWarning>,
}
