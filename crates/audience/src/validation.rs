//! Post-construction audience validation and cross-ad-set overlap
//! detection.

use adpilot_core::config::AudienceConfig;
use adpilot_strategy::AdSetType;

use crate::types::{AudienceResult, ValidationStatus};

/// Validate a constructed audience. Findings only ever escalate the status.
pub fn validate(audience: &mut AudienceResult, config: &AudienceConfig) {
    if audience.estimated_reach.max < config.min_viable_reach {
        if audience.unvalidated_interests {
            // Reach cannot be estimated until the placeholder interests are
            // validated live; defer the hard failure.
            audience.flag(
                ValidationStatus::Warning,
                format!(
                    "estimated reach below {} but interests are pending live validation",
                    config.min_viable_reach
                ),
            );
        } else {
            audience.flag(
                ValidationStatus::Error,
                format!(
                    "estimated max reach {} is below the {} minimum for reliable delivery",
                    audience.estimated_reach.max, config.min_viable_reach
                ),
            );
        }
    }

    if audience.estimated_reach.min > config.max_learning_reach {
        audience.flag(
            ValidationStatus::Warning,
            "audience is extremely large; the learning phase may exhaust budget before converging",
        );
    }

    if audience.targeting.age_min >= audience.targeting.age_max {
        audience.flag(
            ValidationStatus::Error,
            format!(
                "age_min {} must be below age_max {}",
                audience.targeting.age_min, audience.targeting.age_max
            ),
        );
    }

    if audience.targeting.has_lookalike_ref() && audience.targeting.has_plain_custom_ref() {
        audience.flag(
            ValidationStatus::Warning,
            "audience mixes custom and lookalike references; targeting signal is ambiguous",
        );
    }
}

/// Pairwise overlap heuristic: two ad sets of the same broad/interest/
/// lookalike type are assumed to compete in the auction. Checks type
/// collision only, never actual audience membership.
pub fn detect_overlaps(audiences: &mut [AudienceResult]) {
    let overlap_prone = [AdSetType::Broad, AdSetType::Interest, AdSetType::Lookalike];

    for i in 0..audiences.len() {
        for j in (i + 1)..audiences.len() {
            if audiences[i].adset_type == audiences[j].adset_type
                && overlap_prone.contains(&audiences[i].adset_type)
            {
                let warning_i = format!(
                    "likely auction overlap with `{}` (both {:?} audiences)",
                    audiences[j].name, audiences[j].adset_type
                );
                let warning_j = format!(
                    "likely auction overlap with `{}` (both {:?} audiences)",
                    audiences[i].name, audiences[i].adset_type
                );
                audiences[i].overlap_warnings.push(warning_i);
                audiences[j].overlap_warnings.push(warning_j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoLocations, ReachEstimate, Targeting};

    fn audience(name: &str, adset_type: AdSetType, max_reach: u64) -> AudienceResult {
        let mut a = AudienceResult::new(
            name,
            adset_type,
            Targeting {
                geo_locations: GeoLocations {
                    countries: vec!["US".to_string()],
                },
                age_min: 18,
                age_max: 65,
                genders: None,
                flexible_spec: Vec::new(),
                custom_audiences: Vec::new(),
                excluded_custom_audiences: Vec::new(),
            },
        );
        a.estimated_reach = ReachEstimate {
            min: max_reach / 2,
            max: max_reach,
        };
        a
    }

    #[test]
    fn test_reach_boundary_exactly_1000_is_valid() {
        let config = AudienceConfig::default();
        let mut a = audience("a", AdSetType::Broad, 1000);
        validate(&mut a, &config);
        assert_eq!(a.validation_status, ValidationStatus::Valid);

        let mut b = audience("b", AdSetType::Broad, 999);
        validate(&mut b, &config);
        assert_eq!(b.validation_status, ValidationStatus::Error);
    }

    #[test]
    fn test_unvalidated_interests_defer_reach_error() {
        let config = AudienceConfig::default();
        let mut a = audience("a", AdSetType::Interest, 500);
        a.unvalidated_interests = true;
        validate(&mut a, &config);
        assert_eq!(a.validation_status, ValidationStatus::Warning);
    }

    #[test]
    fn test_inverted_age_range_is_error() {
        let config = AudienceConfig::default();
        let mut a = audience("a", AdSetType::Broad, 10_000_000);
        a.targeting.age_min = 40;
        a.targeting.age_max = 30;
        validate(&mut a, &config);
        assert_eq!(a.validation_status, ValidationStatus::Error);
    }

    #[test]
    fn test_huge_audience_warns() {
        let config = AudienceConfig::default();
        let mut a = audience("a", AdSetType::Broad, 500_000_000);
        a.estimated_reach.min = 200_000_000;
        validate(&mut a, &config);
        assert_eq!(a.validation_status, ValidationStatus::Warning);
    }

    #[test]
    fn test_status_never_downgrades() {
        let config = AudienceConfig::default();
        let mut a = audience("a", AdSetType::Broad, 999);
        validate(&mut a, &config);
        assert_eq!(a.validation_status, ValidationStatus::Error);
        // A second, milder pass must not soften the status.
        a.flag(ValidationStatus::Warning, "some advisory note");
        assert_eq!(a.validation_status, ValidationStatus::Error);
    }

    #[test]
    fn test_same_type_pairs_warn_on_both_sides() {
        let mut audiences = vec![
            audience("int-a", AdSetType::Interest, 2_000_000),
            audience("int-b", AdSetType::Interest, 3_000_000),
            audience("ret", AdSetType::Retargeting, 5_000),
        ];
        detect_overlaps(&mut audiences);
        assert_eq!(audiences[0].overlap_warnings.len(), 1);
        assert_eq!(audiences[1].overlap_warnings.len(), 1);
        assert!(audiences[0].overlap_warnings[0].contains("int-b"));
        // Retargeting pairs are exempt from the heuristic.
        assert!(audiences[2].overlap_warnings.is_empty());
    }
}
