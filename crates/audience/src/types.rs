use serde::{Deserialize, Serialize};

use adpilot_strategy::AdSetType;

// ─── Meta-shaped targeting spec ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoLocations {
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestSpec {
    pub id: String,
    pub name: String,
}

/// One flexible-spec group. Groups are combined per the platform's
/// flexible-targeting semantics; the constructor decides how interests are
/// distributed across groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlexibleSpec {
    pub interests: Vec<InterestSpec>,
}

/// Reference to a custom or lookalike audience. IDs may be symbolic
/// placeholder tokens (`{{WEBSITE_VISITORS_30D}}`) resolved by the
/// execution layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceSpecRef {
    pub id: String,
}

/// Targeting spec in the platform's shape. Empty collections are omitted
/// from the serialized payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Targeting {
    pub geo_locations: GeoLocations,
    pub age_min: u8,
    pub age_max: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genders: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flexible_spec: Vec<FlexibleSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_audiences: Vec<AudienceSpecRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_custom_audiences: Vec<AudienceSpecRef>,
}

impl Targeting {
    pub fn has_interests(&self) -> bool {
        self.flexible_spec.iter().any(|g| !g.interests.is_empty())
    }

    pub fn has_lookalike_ref(&self) -> bool {
        self.custom_audiences.iter().any(|r| r.id.contains("LOOKALIKE"))
    }

    pub fn has_plain_custom_ref(&self) -> bool {
        self.custom_audiences
            .iter()
            .any(|r| !r.id.contains("LOOKALIKE"))
    }
}

// ─── Constructed audience ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachEstimate {
    pub min: u64,
    pub max: u64,
}

/// How multiple interests are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCombination {
    /// All interests in a single flexible-spec group.
    #[default]
    Stacked,
    /// One group per interest.
    Flexible,
}

/// One constructed, validated targeting spec for an ad set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceResult {
    pub name: String,
    pub adset_type: AdSetType,
    pub targeting: Targeting,
    pub estimated_reach: ReachEstimate,
    pub validation_status: ValidationStatus,
    pub validation_messages: Vec<String>,
    pub overlap_warnings: Vec<String>,
    pub exclusion_rationale: Vec<String>,
    /// Interests resolved to placeholder IDs pending live validation.
    pub unvalidated_interests: bool,
}

impl AudienceResult {
    pub fn new(name: impl Into<String>, adset_type: AdSetType, targeting: Targeting) -> Self {
        Self {
            name: name.into(),
            adset_type,
            targeting,
            estimated_reach: ReachEstimate::default(),
            validation_status: ValidationStatus::Valid,
            validation_messages: Vec::new(),
            overlap_warnings: Vec::new(),
            exclusion_rationale: Vec::new(),
            unvalidated_interests: false,
        }
    }

    /// Record a finding. The status only ever escalates — an ERROR is never
    /// silently downgraded by a later, milder finding.
    pub fn flag(&mut self, status: ValidationStatus, message: impl Into<String>) {
        if status > self.validation_status {
            self.validation_status = status;
        }
        self.validation_messages.push(message.into());
    }

    /// Whether downstream stages may use this audience as-is.
    pub fn usable(&self) -> bool {
        self.validation_status != ValidationStatus::Error
    }
}
