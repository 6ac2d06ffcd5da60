//! Payload builders: typed Graph API bodies, fixed lookup tables and the
//! single currency-conversion boundary.

use adpilot_core::config::OrchestratorConfig;
use adpilot_strategy::OptimizationGoal;

use crate::tokens::{adset_token, creative_token, TOKEN_CAMPAIGN_ID, TOKEN_PIXEL_ID};
use crate::types::{
    AdCreativeRef, AdPayload, AdSetPayload, AdTrackingSpec, ApiPayload, AssembledAdSet,
    AttributionSpec, BillingEvent, CallToAction, CampaignPayload, CampaignStructure,
    CreativeFeaturesSpec, CreativePayload, CtaValue, CustomEventType, DegreesOfFreedomSpec,
    DestinationType, EntityStatus, HttpMethod, LinkData, ObjectStorySpec, PayloadBody,
    PromotedObject, StandardEnhancements,
};

/// Convert a decimal currency amount into integer minor units (cents).
/// Applied exactly once, at the orchestrator boundary — earlier stages all
/// carry decimal major units.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// `optimization_goal` → `billing_event`. Link-click goals bill on clicks;
/// everything else bills on impressions.
pub fn billing_event_for(goal: OptimizationGoal) -> BillingEvent {
    match goal {
        OptimizationGoal::LinkClicks => BillingEvent::LinkClicks,
        _ => BillingEvent::Impressions,
    }
}

pub fn destination_for(goal: OptimizationGoal) -> DestinationType {
    match goal {
        OptimizationGoal::AppInstalls => DestinationType::App,
        _ => DestinationType::Website,
    }
}

/// Conversion-style goals carry a `promoted_object` naming the pixel event
/// to optimize toward; delivery goals do not.
pub fn custom_event_for(goal: OptimizationGoal) -> Option<CustomEventType> {
    match goal {
        OptimizationGoal::OffsiteConversions => Some(CustomEventType::Purchase),
        OptimizationGoal::LeadGeneration => Some(CustomEventType::Lead),
        _ => None,
    }
}

/// Append tracking parameters to the destination link. An unparseable URL
/// is passed through untouched rather than dropped.
pub fn tracked_link(destination: &str, campaign_name: &str, config: &OrchestratorConfig) -> String {
    match url::Url::parse(destination) {
        Ok(mut parsed) => {
            let campaign_slug = campaign_name
                .to_lowercase()
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect::<String>();
            parsed
                .query_pairs_mut()
                .append_pair("utm_source", &config.tracking_source)
                .append_pair("utm_medium", "paid_social")
                .append_pair("utm_campaign", &campaign_slug);
            parsed.to_string()
        }
        Err(_) => destination.to_string(),
    }
}

pub fn build_campaign_payload(structure: &CampaignStructure, account_id: &str) -> ApiPayload {
    ApiPayload {
        endpoint: format!("/act_{account_id}/campaigns"),
        method: HttpMethod::Post,
        payload: PayloadBody::Campaign(CampaignPayload {
            name: structure.campaign_name.clone(),
            objective: structure.objective,
            status: EntityStatus::Paused,
            special_ad_categories: Vec::new(),
            buying_type: "AUCTION".to_string(),
            spend_cap: (structure.total_budget > 0.0)
                .then(|| to_minor_units(structure.total_budget)),
        }),
        dependencies: Vec::new(),
        validation_rules: vec![
            "objective must be one of the ODAX outcome objectives".to_string(),
            "spend_cap is integer minor currency units".to_string(),
        ],
    }
}

pub fn build_adset_payload(
    index: usize,
    ad_set: &AssembledAdSet,
    structure: &CampaignStructure,
    account_id: &str,
) -> ApiPayload {
    let promoted_object = custom_event_for(ad_set.optimization_goal).and_then(|event| {
        structure.pixel_id.as_ref().map(|_| PromotedObject {
            pixel_id: TOKEN_PIXEL_ID.to_string(),
            custom_event_type: event,
        })
    });

    let mut dependencies = vec![TOKEN_CAMPAIGN_ID.to_string()];
    if promoted_object.is_some() {
        dependencies.push(TOKEN_PIXEL_ID.to_string());
    }
    for reference in ad_set
        .audience
        .targeting
        .custom_audiences
        .iter()
        .chain(&ad_set.audience.targeting.excluded_custom_audiences)
    {
        if crate::tokens::is_token(&reference.id) {
            dependencies.push(reference.id.clone());
        }
    }

    let placements = &ad_set.placements.placements;
    ApiPayload {
        endpoint: format!("/act_{account_id}/adsets"),
        method: HttpMethod::Post,
        payload: PayloadBody::AdSet(AdSetPayload {
            name: ad_set.name.clone(),
            campaign_id: TOKEN_CAMPAIGN_ID.to_string(),
            status: EntityStatus::Paused,
            daily_budget: to_minor_units(ad_set.daily_budget),
            billing_event: billing_event_for(ad_set.optimization_goal),
            optimization_goal: ad_set.optimization_goal,
            bid_strategy: ad_set.bid_strategy,
            destination_type: destination_for(ad_set.optimization_goal),
            promoted_object,
            targeting: ad_set.audience.targeting.clone(),
            publisher_platforms: placements.publisher_platforms(),
            facebook_positions: placements.facebook_positions.clone(),
            instagram_positions: placements.instagram_positions.clone(),
            audience_network_positions: placements.audience_network_positions.clone(),
            messenger_positions: placements.messenger_positions.clone(),
            // iOS14+ attribution: 7-day click, 1-day view, on every ad set.
            attribution_spec: vec![
                AttributionSpec {
                    event_type: "CLICK_THROUGH".to_string(),
                    window_days: 7,
                },
                AttributionSpec {
                    event_type: "VIEW_THROUGH".to_string(),
                    window_days: 1,
                },
            ],
        }),
        dependencies,
        validation_rules: vec![
            "placement position lists are top-level ad-set fields, not targeting fields"
                .to_string(),
            format!("ad set {index}: daily_budget is integer minor currency units"),
        ],
    }
}

/// One creative payload per variant. `creative_index` numbers creatives
/// globally so ad payloads can reference them by token.
pub fn build_creative_payload(
    creative_index: usize,
    ad_set: &AssembledAdSet,
    variant: &adpilot_core::types::CreativeVariant,
    structure: &CampaignStructure,
    account_id: &str,
    config: &OrchestratorConfig,
) -> ApiPayload {
    let link = tracked_link(&structure.destination_url, &structure.campaign_name, config);
    ApiPayload {
        endpoint: format!("/act_{account_id}/adcreatives"),
        method: HttpMethod::Post,
        payload: PayloadBody::Creative(CreativePayload {
            name: format!("{} — creative {}", ad_set.name, creative_index + 1),
            object_story_spec: ObjectStorySpec {
                page_id: structure.page_id.clone(),
                instagram_actor_id: structure.instagram_actor_id.clone(),
                link_data: LinkData {
                    link,
                    message: variant.body.clone(),
                    name: variant.headline.clone(),
                    call_to_action: CallToAction {
                        cta_type: variant.call_to_action,
                        value: CtaValue {
                            link: structure.destination_url.clone(),
                        },
                    },
                    image_url: variant.asset_url.clone(),
                },
            },
            degrees_of_freedom_spec: DegreesOfFreedomSpec {
                creative_features_spec: CreativeFeaturesSpec {
                    standard_enhancements: StandardEnhancements {
                        enroll_status: "OPT_IN".to_string(),
                    },
                },
            },
        }),
        dependencies: Vec::new(),
        validation_rules: vec!["page must be connected to the ad account".to_string()],
    }
}

pub fn build_ad_payload(
    adset_index: usize,
    creative_index: usize,
    ad_set: &AssembledAdSet,
    structure: &CampaignStructure,
    account_id: &str,
) -> ApiPayload {
    let mut dependencies = vec![
        adset_token(adset_index),
        creative_token(creative_index),
    ];
    let tracking_specs = if structure.pixel_id.is_some() {
        dependencies.push(TOKEN_PIXEL_ID.to_string());
        vec![AdTrackingSpec {
            action_type: vec!["offsite_conversion".to_string()],
            fb_pixel: vec![TOKEN_PIXEL_ID.to_string()],
        }]
    } else {
        Vec::new()
    };

    ApiPayload {
        endpoint: format!("/act_{account_id}/ads"),
        method: HttpMethod::Post,
        payload: PayloadBody::Ad(AdPayload {
            name: format!("{} — ad {}", ad_set.name, creative_index + 1),
            adset_id: adset_token(adset_index),
            creative: AdCreativeRef {
                creative_id: creative_token(creative_index),
            },
            status: EntityStatus::Paused,
            tracking_specs,
        }),
        dependencies,
        validation_rules: vec![
            "adset_id and creative_id placeholders must be resolved before this call".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion_is_exact() {
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(20.00), 2000);
        assert_eq!(to_minor_units(0.01), 1);
        assert_eq!(to_minor_units(100.0), 10_000);
    }

    #[test]
    fn test_billing_event_lookup() {
        assert_eq!(
            billing_event_for(OptimizationGoal::LinkClicks),
            BillingEvent::LinkClicks
        );
        assert_eq!(
            billing_event_for(OptimizationGoal::OffsiteConversions),
            BillingEvent::Impressions
        );
        assert_eq!(
            billing_event_for(OptimizationGoal::Reach),
            BillingEvent::Impressions
        );
    }

    #[test]
    fn test_destination_lookup() {
        assert_eq!(
            destination_for(OptimizationGoal::AppInstalls),
            DestinationType::App
        );
        assert_eq!(
            destination_for(OptimizationGoal::LinkClicks),
            DestinationType::Website
        );
    }

    #[test]
    fn test_custom_event_lookup() {
        assert_eq!(
            custom_event_for(OptimizationGoal::OffsiteConversions),
            Some(CustomEventType::Purchase)
        );
        assert_eq!(
            custom_event_for(OptimizationGoal::LeadGeneration),
            Some(CustomEventType::Lead)
        );
        assert_eq!(custom_event_for(OptimizationGoal::Reach), None);
    }

    #[test]
    fn test_tracked_link_appends_utm_parameters() {
        let config = OrchestratorConfig::default();
        let link = tracked_link("https://shop.example.com/widget", "Summer Sale", &config);
        assert!(link.contains("utm_source=adpilot"));
        assert!(link.contains("utm_medium=paid_social"));
        assert!(link.contains("utm_campaign=summer_sale"));
    }

    #[test]
    fn test_tracked_link_passes_through_unparseable() {
        let config = OrchestratorConfig::default();
        assert_eq!(tracked_link("not a url", "x", &config), "not a url");
    }
}
