//! Account auditor — classifies an ad account's historical data richness
//! and derives risk flags plus a recommended strategic approach.
//!
//! Pure: no network calls, no side effects. Tolerates missing or empty
//! arrays and never panics on malformed input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use adpilot_core::config::AuditConfig;
use adpilot_core::types::{CampaignObjective, RawAccountData};

/// Data-maturity tier of an ad account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataLevel {
    ZeroData,
    LowData,
    RichData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixelHealth {
    None,
    Basic,
    Rich,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategicApproach {
    PerformanceScaling,
    ConversionOptimization,
    DiscoveryFirst,
}

/// Aggregated account performance over the lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub spend: f64,
    pub conversions: f64,
    pub clicks: u64,
    pub impressions: u64,
    /// clicks / impressions (0 when no impressions).
    pub ctr: f64,
    /// spend / conversions (0 when no conversions).
    pub avg_cpa: f64,
    /// conversions × assumed order value / spend. An approximation built on
    /// a configured average order value, not a measured revenue signal.
    pub estimated_roas: f64,
    /// Per-event pixel counts across all pixels.
    pub pixel_event_counts: BTreeMap<String, u64>,
    pub custom_audience_count: usize,
    pub lookalike_audience_count: usize,
    pub largest_custom_audience: u64,
}

/// Tier-derived strategic recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub approach: StrategicApproach,
    pub primary_objective: CampaignObjective,
    /// Relative budget split per ad-set type.
    pub budget_allocation: BTreeMap<String, f64>,
}

/// Classification of an ad account's data maturity. Computed once per
/// pipeline run and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub data_level: DataLevel,
    pub pixel_health: PixelHealth,
    /// Total tracked conversion-pixel events.
    pub usable_events: u64,
    pub account_summary: AccountSummary,
    pub risks: Vec<String>,
    pub recommendations: Recommendations,
}

/// Audit raw account data into a tier classification with risks and a
/// recommended approach.
pub fn audit(data: &RawAccountData, cfg: &AuditConfig) -> AuditResult {
    let mut spend = 0.0;
    let mut conversions = 0.0;
    let mut clicks = 0u64;
    let mut impressions = 0u64;
    for row in &data.insights {
        spend += row.spend;
        conversions += row.conversions;
        clicks += row.clicks;
        impressions += row.impressions;
    }

    let mut pixel_event_counts: BTreeMap<String, u64> = BTreeMap::new();
    for pixel in &data.pixels {
        for event in &pixel.events {
            *pixel_event_counts.entry(event.event.clone()).or_insert(0) += event.count;
        }
    }
    let usable_events: u64 = pixel_event_counts.values().sum();

    let pixel_health = if usable_events > cfg.rich_pixel_events {
        PixelHealth::Rich
    } else if usable_events > cfg.basic_pixel_events {
        PixelHealth::Basic
    } else {
        PixelHealth::None
    };

    let ctr = if impressions > 0 {
        clicks as f64 / impressions as f64
    } else {
        0.0
    };
    let avg_cpa = if conversions > 0.0 {
        spend / conversions
    } else {
        0.0
    };
    let estimated_roas = if spend > 0.0 {
        conversions * cfg.assumed_order_value / spend
    } else {
        0.0
    };

    let data_level = classify(spend, conversions, usable_events, estimated_roas, cfg);

    let summary = AccountSummary {
        spend,
        conversions,
        clicks,
        impressions,
        ctr,
        avg_cpa,
        estimated_roas,
        pixel_event_counts,
        custom_audience_count: data.custom_audiences.len(),
        lookalike_audience_count: data.lookalike_audiences.len(),
        largest_custom_audience: data
            .custom_audiences
            .iter()
            .map(|a| a.approximate_count)
            .max()
            .unwrap_or(0),
    };

    let risks = collect_risks(&summary, pixel_health, cfg);
    let recommendations = recommendations_for(data_level);

    debug!(
        ?data_level,
        ?pixel_health,
        usable_events,
        risk_count = risks.len(),
        "account audit complete"
    );

    AuditResult {
        data_level,
        pixel_health,
        usable_events,
        account_summary: summary,
        risks,
        recommendations,
    }
}

fn classify(
    spend: f64,
    conversions: f64,
    usable_events: u64,
    estimated_roas: f64,
    cfg: &AuditConfig,
) -> DataLevel {
    if conversions >= cfg.rich_min_conversions && estimated_roas > cfg.rich_min_roas {
        DataLevel::RichData
    } else if conversions >= cfg.low_min_conversions
        || (spend > cfg.low_min_spend && usable_events > cfg.low_min_events)
    {
        DataLevel::LowData
    } else {
        DataLevel::ZeroData
    }
}

fn collect_risks(
    summary: &AccountSummary,
    pixel_health: PixelHealth,
    cfg: &AuditConfig,
) -> Vec<String> {
    let mut risks = Vec::new();
    if pixel_health == PixelHealth::None {
        risks.push(
            "No usable pixel events — install and verify the Meta pixel before \
             optimizing for conversions"
                .to_string(),
        );
    }
    if summary.custom_audience_count == 0 {
        risks.push(
            "No custom audiences — retargeting and lookalike seeds are unavailable".to_string(),
        );
    }
    if summary.impressions > 0 && summary.ctr < cfg.low_ctr_threshold {
        risks.push(format!(
            "Low historical CTR ({:.2}%) — creatives may need refreshing",
            summary.ctr * 100.0
        ));
    }
    if summary.avg_cpa > cfg.high_cpa_threshold {
        risks.push(format!(
            "High average CPA (${:.2}) — review conversion funnel before scaling",
            summary.avg_cpa
        ));
    }
    risks
}

/// Tier → recommendation lookup. A fixed table, not inference.
fn recommendations_for(level: DataLevel) -> Recommendations {
    match level {
        DataLevel::RichData => Recommendations {
            approach: StrategicApproach::PerformanceScaling,
            primary_objective: CampaignObjective::OutcomeSales,
            budget_allocation: BTreeMap::from([
                ("retargeting".to_string(), 0.4),
                ("lookalike".to_string(), 0.4),
                ("broad".to_string(), 0.2),
            ]),
        },
        DataLevel::LowData => Recommendations {
            approach: StrategicApproach::ConversionOptimization,
            primary_objective: CampaignObjective::OutcomeSales,
            budget_allocation: BTreeMap::from([
                ("retargeting".to_string(), 0.3),
                ("interest".to_string(), 0.4),
                ("broad".to_string(), 0.3),
            ]),
        },
        DataLevel::ZeroData => Recommendations {
            approach: StrategicApproach::DiscoveryFirst,
            primary_objective: CampaignObjective::OutcomeTraffic,
            budget_allocation: BTreeMap::from([
                ("broad".to_string(), 0.7),
                ("interest".to_string(), 0.3),
            ]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::types::{AudienceRef, InsightRow, Pixel, PixelEventCount};

    fn insight(spend: f64, impressions: u64, clicks: u64, conversions: f64) -> InsightRow {
        InsightRow {
            date_start: None,
            date_stop: None,
            spend,
            impressions,
            clicks,
            conversions,
        }
    }

    fn pixel(events: Vec<(&str, u64)>) -> Pixel {
        Pixel {
            id: "px-1".to_string(),
            name: "Main pixel".to_string(),
            events: events
                .into_iter()
                .map(|(event, count)| PixelEventCount {
                    event: event.to_string(),
                    count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_zero_data_cold_account() {
        let result = audit(&RawAccountData::default(), &AuditConfig::default());
        assert_eq!(result.data_level, DataLevel::ZeroData);
        assert_eq!(result.pixel_health, PixelHealth::None);
        assert_eq!(result.usable_events, 0);
        assert!(!result.risks.is_empty());
        assert!(result.risks[0].contains("pixel"));
        assert_eq!(
            result.recommendations.approach,
            StrategicApproach::DiscoveryFirst
        );
    }

    #[test]
    fn test_rich_data_classification() {
        let data = RawAccountData {
            insights: vec![insight(2000.0, 500_000, 8000, 80.0)],
            pixels: vec![pixel(vec![("Purchase", 900), ("AddToCart", 600)])],
            custom_audiences: vec![AudienceRef {
                id: "ca-1".to_string(),
                name: "Purchasers".to_string(),
                approximate_count: 12_000,
            }],
            ..Default::default()
        };
        // 80 conversions × $50 / $2000 spend = 2.0 ROAS
        let result = audit(&data, &AuditConfig::default());
        assert_eq!(result.data_level, DataLevel::RichData);
        assert_eq!(result.pixel_health, PixelHealth::Rich);
        assert_eq!(
            result.recommendations.approach,
            StrategicApproach::PerformanceScaling
        );
        assert_eq!(
            result.recommendations.primary_objective,
            CampaignObjective::OutcomeSales
        );
    }

    #[test]
    fn test_low_data_via_conversions() {
        let data = RawAccountData {
            insights: vec![insight(300.0, 40_000, 900, 15.0)],
            ..Default::default()
        };
        let result = audit(&data, &AuditConfig::default());
        assert_eq!(result.data_level, DataLevel::LowData);
    }

    #[test]
    fn test_low_data_via_spend_and_events() {
        let data = RawAccountData {
            insights: vec![insight(1500.0, 100_000, 2000, 2.0)],
            pixels: vec![pixel(vec![("ViewContent", 400), ("AddToCart", 200)])],
            ..Default::default()
        };
        let result = audit(&data, &AuditConfig::default());
        assert_eq!(result.data_level, DataLevel::LowData);
        assert_eq!(result.pixel_health, PixelHealth::Basic);
    }

    #[test]
    fn test_tier_monotonic_in_conversions() {
        let cfg = AuditConfig::default();
        let mut previous = DataLevel::ZeroData;
        for conversions in [0.0, 5.0, 10.0, 49.0, 60.0, 200.0] {
            let data = RawAccountData {
                insights: vec![insight(1000.0, 80_000, 1500, conversions)],
                ..Default::default()
            };
            let level = audit(&data, &cfg).data_level;
            assert!(
                level >= previous,
                "tier decreased at conversions={conversions}"
            );
            previous = level;
        }
    }

    #[test]
    fn test_cpa_zero_when_no_conversions() {
        let data = RawAccountData {
            insights: vec![insight(500.0, 10_000, 100, 0.0)],
            ..Default::default()
        };
        let result = audit(&data, &AuditConfig::default());
        assert_eq!(result.account_summary.avg_cpa, 0.0);
        assert_eq!(result.account_summary.estimated_roas, 0.0);
    }

    #[test]
    fn test_low_ctr_and_high_cpa_risks() {
        let data = RawAccountData {
            insights: vec![insight(1200.0, 400_000, 1000, 12.0)],
            pixels: vec![pixel(vec![("Purchase", 150)])],
            ..Default::default()
        };
        // CTR = 0.25%, CPA = $100
        let result = audit(&data, &AuditConfig::default());
        assert!(result.risks.iter().any(|r| r.contains("CTR")));
        assert!(result.risks.iter().any(|r| r.contains("CPA")));
    }
}
