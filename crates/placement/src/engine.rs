//! Placement intelligence — format-gated placement selection per ad set,
//! tuned by audience type and size.

use tracing::debug;

use adpilot_core::types::CreativeAsset;
use adpilot_strategy::{AdSetType, MetricRange};

use crate::formats::FormatAnalysis;
use crate::types::{
    CreativeRequirement, PerformanceExpectation, PlacementResult, PlacementSet, PlacementWarning,
    VolumePotential, WarningSeverity, AN_CLASSIC, FB_FEED, FB_RIGHT_HAND_COLUMN, FB_STORY,
    IG_FEED, IG_REELS, IG_STORY, MESSENGER_HOME,
};

/// Audience Network needs enough creative volume to avoid thin, low-quality
/// delivery.
const AUDIENCE_NETWORK_MIN_ASSETS: usize = 3;
/// Below this estimated reach, Audience Network saturates the audience.
const SMALL_AUDIENCE_REACH: u64 = 100_000;
/// Advisory CTR boost for high-intent retargeting audiences.
const RETARGETING_CTR_BOOST: f64 = 1.5;

/// What placement selection needs to know about one planned ad set.
#[derive(Debug, Clone)]
pub struct AdSetPlacementInput {
    pub name: String,
    pub adset_type: AdSetType,
    pub estimated_max_reach: u64,
}

/// Select placements for every ad set given the available creative assets.
pub fn determine_placements(
    adsets: &[AdSetPlacementInput],
    assets: &[CreativeAsset],
) -> Vec<PlacementResult> {
    let formats = FormatAnalysis::analyze(assets);
    debug!(
        total_assets = formats.total_assets,
        vertical_video = formats.has_vertical_video,
        "creative format analysis"
    );
    adsets
        .iter()
        .map(|adset| placements_for(adset, &formats))
        .collect()
}

fn placements_for(adset: &AdSetPlacementInput, formats: &FormatAnalysis) -> PlacementResult {
    let mut result = PlacementResult {
        adset_name: adset.name.clone(),
        placements: PlacementSet::default(),
        creative_requirements: Vec::new(),
        performance_expectations: Vec::new(),
        warnings: Vec::new(),
    };

    select_placements(adset, formats, &mut result);
    tune_for_audience(adset, &mut result);
    validate(&mut result);
    result
}

fn select_placements(
    adset: &AdSetPlacementInput,
    formats: &FormatAnalysis,
    result: &mut PlacementResult,
) {
    // Feeds: the workhorse placements; square or landscape in any medium.
    if formats.has_feed_format() {
        result.placements.facebook_positions.push(FB_FEED.to_string());
        result.placements.instagram_positions.push(IG_FEED.to_string());
        result.performance_expectations.push(expectation(
            "feed",
            0.015,
            0.025,
            10.0,
            20.0,
            VolumePotential::High,
        ));
    }

    // Reels: strictly vertical video, and worth prioritizing.
    if formats.has_vertical_video {
        result.placements.instagram_positions.push(IG_REELS.to_string());
        result.creative_requirements.push(CreativeRequirement {
            placement: "instagram_reels".to_string(),
            format: "video".to_string(),
            aspect_ratio: "9:16".to_string(),
            note: "Full-screen vertical video, sound on".to_string(),
        });
        result.performance_expectations.push(expectation(
            "reels",
            0.012,
            0.022,
            4.0,
            10.0,
            VolumePotential::Medium,
        ));
    } else {
        result.warnings.push(PlacementWarning {
            severity: WarningSeverity::Warning,
            message: "No vertical video available — Reels is a high-performing placement \
                      worth adding a 9:16 asset for"
                .to_string(),
        });
    }

    // Stories: vertical video or portrait image.
    if formats.has_story_format() {
        result.placements.facebook_positions.push(FB_STORY.to_string());
        result.placements.instagram_positions.push(IG_STORY.to_string());
        result.creative_requirements.push(CreativeRequirement {
            placement: "stories".to_string(),
            format: if formats.has_vertical_video {
                "video"
            } else {
                "image"
            }
            .to_string(),
            aspect_ratio: "9:16".to_string(),
            note: "Full-screen vertical format".to_string(),
        });
        result.performance_expectations.push(expectation(
            "stories",
            0.010,
            0.018,
            6.0,
            12.0,
            VolumePotential::Medium,
        ));
    }

    // Right-hand column: desktop-only, image-only, cheap reach.
    if formats.has_square_or_landscape_image() {
        result
            .placements
            .facebook_positions
            .push(FB_RIGHT_HAND_COLUMN.to_string());
        result.performance_expectations.push(expectation(
            "right_hand_column",
            0.003,
            0.008,
            2.0,
            5.0,
            VolumePotential::Low,
        ));
    }

    // Audience Network: volume-gated.
    if formats.total_assets >= AUDIENCE_NETWORK_MIN_ASSETS && formats.has_feed_format() {
        result
            .placements
            .audience_network_positions
            .push(AN_CLASSIC.to_string());
        result.performance_expectations.push(expectation(
            "audience_network",
            0.005,
            0.012,
            1.0,
            4.0,
            VolumePotential::Medium,
        ));
    }

    // Messenger: conservative, high-intent-only.
    if adset.adset_type == AdSetType::Retargeting && formats.has_square_image {
        result
            .placements
            .messenger_positions
            .push(MESSENGER_HOME.to_string());
        result.performance_expectations.push(expectation(
            "messenger_home",
            0.008,
            0.015,
            5.0,
            10.0,
            VolumePotential::Low,
        ));
    }
}

/// Second pass: adjust the format-gated selection for the audience's type
/// and size.
fn tune_for_audience(adset: &AdSetPlacementInput, result: &mut PlacementResult) {
    if adset.adset_type == AdSetType::Retargeting {
        drop_audience_network(result, "retargeting audiences convert poorly on Audience Network");
        for expectation in &mut result.performance_expectations {
            expectation.ctr.low *= RETARGETING_CTR_BOOST;
            expectation.ctr.high *= RETARGETING_CTR_BOOST;
        }
    }

    if adset.estimated_max_reach < SMALL_AUDIENCE_REACH {
        drop_audience_network(
            result,
            "audience too small for Audience Network without rapid saturation",
        );
    }

    if adset.adset_type == AdSetType::Interest {
        for expectation in &mut result.performance_expectations {
            if expectation.placement == "reels" {
                expectation.volume_potential = VolumePotential::High;
            }
        }
    }
}

fn drop_audience_network(result: &mut PlacementResult, reason: &str) {
    if result.placements.audience_network_positions.is_empty() {
        return;
    }
    result.placements.audience_network_positions.clear();
    result
        .performance_expectations
        .retain(|e| e.placement != "audience_network");
    result.warnings.push(PlacementWarning {
        severity: WarningSeverity::Info,
        message: format!("Audience Network removed: {reason}"),
    });
}

fn validate(result: &mut PlacementResult) {
    let total = result.placements.total();
    if total == 0 {
        result.warnings.push(PlacementWarning {
            severity: WarningSeverity::Critical,
            message: "No placements selected — available creative formats support none of \
                      the eligible placements"
                .to_string(),
        });
    } else if total == 1 {
        result.warnings.push(PlacementWarning {
            severity: WarningSeverity::Warning,
            message: "Only one placement selected; delivery cannot diversify across surfaces"
                .to_string(),
        });
    }

    if !result
        .placements
        .instagram_positions
        .iter()
        .any(|p| p == IG_REELS)
        && !result.warnings.iter().any(|w| w.message.contains("Reels"))
    {
        result.warnings.push(PlacementWarning {
            severity: WarningSeverity::Warning,
            message: "Reels placement not selected".to_string(),
        });
    }
    if !result
        .placements
        .instagram_positions
        .iter()
        .any(|p| p == IG_STORY)
    {
        result.warnings.push(PlacementWarning {
            severity: WarningSeverity::Warning,
            message: "Stories placement not selected — add a 9:16 or 4:5 asset".to_string(),
        });
    }
}

fn expectation(
    placement: &str,
    ctr_low: f64,
    ctr_high: f64,
    cpm_low: f64,
    cpm_high: f64,
    volume: VolumePotential,
) -> PerformanceExpectation {
    PerformanceExpectation {
        placement: placement.to_string(),
        ctr: MetricRange {
            low: ctr_low,
            high: ctr_high,
        },
        cpm: MetricRange {
            low: cpm_low,
            high: cpm_high,
        },
        volume_potential: volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::types::{AspectRatio, AssetKind};

    fn asset(kind: AssetKind, ratio: AspectRatio) -> CreativeAsset {
        CreativeAsset {
            url: "https://cdn.example.com/a".to_string(),
            kind,
            aspect_ratio: ratio,
            duration_secs: None,
        }
    }

    fn adset(name: &str, adset_type: AdSetType, reach: u64) -> AdSetPlacementInput {
        AdSetPlacementInput {
            name: name.to_string(),
            adset_type,
            estimated_max_reach: reach,
        }
    }

    #[test]
    fn test_square_images_only_never_yield_reels_or_audience_network() {
        // Two square images: feed formats exist, but no vertical video and
        // fewer than three assets.
        let assets = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Image, AspectRatio::Square),
        ];
        for adset_type in [
            AdSetType::Retargeting,
            AdSetType::Lookalike,
            AdSetType::Interest,
            AdSetType::Broad,
        ] {
            let results =
                determine_placements(&[adset("a", adset_type, 5_000_000)], &assets);
            let p = &results[0].placements;
            assert!(!p.instagram_positions.iter().any(|x| x == IG_REELS));
            assert!(p.audience_network_positions.is_empty());
        }
    }

    #[test]
    fn test_messenger_is_retargeting_only() {
        let assets = vec![asset(AssetKind::Image, AspectRatio::Square)];
        let results = determine_placements(
            &[
                adset("ret", AdSetType::Retargeting, 40_000),
                adset("int", AdSetType::Interest, 2_000_000),
            ],
            &assets,
        );
        assert_eq!(
            results[0].placements.messenger_positions,
            vec![MESSENGER_HOME.to_string()]
        );
        assert!(results[1].placements.messenger_positions.is_empty());
    }

    #[test]
    fn test_vertical_video_unlocks_reels_and_stories() {
        let assets = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Video, AspectRatio::Vertical),
        ];
        let results = determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &assets);
        let p = &results[0].placements;
        assert!(p.instagram_positions.iter().any(|x| x == IG_REELS));
        assert!(p.instagram_positions.iter().any(|x| x == IG_STORY));
        assert!(p.facebook_positions.iter().any(|x| x == FB_STORY));
        assert!(results[0]
            .creative_requirements
            .iter()
            .any(|r| r.placement == "instagram_reels" && r.aspect_ratio == "9:16"));
    }

    #[test]
    fn test_missing_vertical_video_warns_about_reels() {
        let assets = vec![asset(AssetKind::Image, AspectRatio::Landscape)];
        let results = determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &assets);
        assert!(results[0]
            .warnings
            .iter()
            .any(|w| w.message.contains("Reels") && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_audience_network_volume_gate() {
        let thin = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Image, AspectRatio::Landscape),
        ];
        let rich = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Image, AspectRatio::Landscape),
            asset(AssetKind::Video, AspectRatio::Landscape),
        ];
        let thin_result =
            determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &thin);
        let rich_result =
            determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &rich);
        assert!(thin_result[0]
            .placements
            .audience_network_positions
            .is_empty());
        assert_eq!(
            rich_result[0].placements.audience_network_positions,
            vec![AN_CLASSIC.to_string()]
        );
    }

    #[test]
    fn test_retargeting_drops_audience_network_and_boosts_ctr() {
        let assets = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Image, AspectRatio::Landscape),
            asset(AssetKind::Video, AspectRatio::Landscape),
        ];
        let broad = determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &assets);
        let ret = determine_placements(&[adset("r", AdSetType::Retargeting, 20_000_000)], &assets);

        assert!(!broad[0].placements.audience_network_positions.is_empty());
        assert!(ret[0].placements.audience_network_positions.is_empty());

        let broad_feed = broad[0]
            .performance_expectations
            .iter()
            .find(|e| e.placement == "feed")
            .unwrap();
        let ret_feed = ret[0]
            .performance_expectations
            .iter()
            .find(|e| e.placement == "feed")
            .unwrap();
        assert!((ret_feed.ctr.high - broad_feed.ctr.high * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_small_audience_drops_audience_network() {
        let assets = vec![
            asset(AssetKind::Image, AspectRatio::Square),
            asset(AssetKind::Image, AspectRatio::Landscape),
            asset(AssetKind::Video, AspectRatio::Landscape),
        ];
        let results = determine_placements(&[adset("small", AdSetType::Interest, 50_000)], &assets);
        assert!(results[0]
            .placements
            .audience_network_positions
            .is_empty());
        assert!(results[0]
            .warnings
            .iter()
            .any(|w| w.message.contains("saturation")));
    }

    #[test]
    fn test_interest_bumps_reels_volume() {
        let assets = vec![asset(AssetKind::Video, AspectRatio::Vertical)];
        let results =
            determine_placements(&[adset("int", AdSetType::Interest, 5_000_000)], &assets);
        let reels = results[0]
            .performance_expectations
            .iter()
            .find(|e| e.placement == "reels")
            .unwrap();
        assert_eq!(reels.volume_potential, VolumePotential::High);
    }

    #[test]
    fn test_no_assets_is_critical_not_fatal() {
        let results = determine_placements(&[adset("b", AdSetType::Broad, 20_000_000)], &[]);
        assert_eq!(results[0].placements.total(), 0);
        assert!(results[0]
            .warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Critical));
    }
}
