//! Placeholder-token resolution. Payloads reference platform-assigned IDs
//! that do not exist until the execution layer creates the parent object;
//! those references are symbolic `{{TOKEN}}` strings. Resolution is an
//! explicit token → id map applied in one typed pass over the finite set of
//! placeholder-bearing fields — never a recursive walk of untyped trees.

use std::collections::HashMap;

use crate::types::{CampaignOrchestrationResult, PayloadBody};

pub const TOKEN_CAMPAIGN_ID: &str = "{{CAMPAIGN_ID}}";
pub const TOKEN_PIXEL_ID: &str = "{{PIXEL_ID}}";

pub fn adset_token(index: usize) -> String {
    format!("{{{{ADSET_{index}_ID}}}}")
}

pub fn creative_token(index: usize) -> String {
    format!("{{{{CREATIVE_{index}_ID}}}}")
}

pub fn is_token(value: &str) -> bool {
    value.starts_with("{{") && value.ends_with("}}")
}

/// Token → platform-assigned ID map, built up by the execution layer as
/// objects are created.
#[derive(Debug, Default, Clone)]
pub struct DependencyMap {
    resolved: HashMap<String, String>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, id: impl Into<String>) {
        self.resolved.insert(token.into(), id.into());
    }

    /// Resolve a value if it is a known token; otherwise return it as-is.
    pub fn resolve(&self, value: &str) -> String {
        self.resolved
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }

    pub fn is_resolved(&self, token: &str) -> bool {
        self.resolved.contains_key(token)
    }
}

/// Substitute every resolved token in the result's payloads. Fields that
/// can carry tokens are enumerated here explicitly; unresolved tokens are
/// left in place for a later pass. Satisfied dependencies are removed from
/// each payload's dependency list.
pub fn resolve_tokens(result: &mut CampaignOrchestrationResult, map: &DependencyMap) {
    for api_payload in result
        .ad_sets
        .iter_mut()
        .chain(result.ads.iter_mut())
        .chain(std::iter::once(&mut result.campaign))
        .chain(result.creatives.iter_mut())
    {
        match &mut api_payload.payload {
            PayloadBody::AdSet(adset) => {
                adset.campaign_id = map.resolve(&adset.campaign_id);
                if let Some(promoted) = &mut adset.promoted_object {
                    promoted.pixel_id = map.resolve(&promoted.pixel_id);
                }
                for reference in adset
                    .targeting
                    .custom_audiences
                    .iter_mut()
                    .chain(adset.targeting.excluded_custom_audiences.iter_mut())
                {
                    reference.id = map.resolve(&reference.id);
                }
            }
            PayloadBody::Ad(ad) => {
                ad.adset_id = map.resolve(&ad.adset_id);
                ad.creative.creative_id = map.resolve(&ad.creative.creative_id);
                for spec in &mut ad.tracking_specs {
                    for pixel in &mut spec.fb_pixel {
                        *pixel = map.resolve(pixel);
                    }
                }
            }
            PayloadBody::Campaign(_) | PayloadBody::Creative(_) => {}
        }
        api_payload
            .dependencies
            .retain(|token| !map.is_resolved(token));
    }
}
