//! Interest-name resolution against the platform's ad-interest search.
//!
//! The resolver is an external I/O dependency: lookups are deduplicated and
//! cached per resolver instance, and its failure degrades to placeholder
//! IDs rather than aborting the ad set's construction.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use adpilot_core::config::InterestServiceConfig;
use adpilot_core::error::{PipelineError, PipelineResult};

use crate::types::InterestSpec;

/// Generic ID for interests that could not be resolved; replaced once the
/// execution layer validates the interest live.
pub const PLACEHOLDER_INTEREST_ID: &str = "0";

#[async_trait]
pub trait InterestResolver: Send + Sync {
    /// Resolve interest names to platform interest specs. Returns one spec
    /// per distinct input name, in input order; names with no match carry
    /// the placeholder ID.
    async fn resolve(&self, names: &[String]) -> PipelineResult<Vec<InterestSpec>>;
}

/// Name-only mapping used when no resolver is configured or the service is
/// unavailable.
pub fn placeholder_interests(names: &[String]) -> Vec<InterestSpec> {
    dedup_names(names)
        .into_iter()
        .map(|name| InterestSpec {
            id: PLACEHOLDER_INTEREST_ID.to_string(),
            name,
        })
        .collect()
}

fn dedup_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen
            .iter()
            .any(|s: &String| s.eq_ignore_ascii_case(trimmed))
        {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

#[derive(Debug, Deserialize)]
struct InterestSearchResponse {
    #[serde(default)]
    data: Vec<InterestSearchHit>,
}

#[derive(Debug, Deserialize)]
struct InterestSearchHit {
    id: String,
    name: String,
}

/// Graph API `search?type=adinterest` client with a per-instance lookup
/// cache.
pub struct GraphInterestResolver {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    cache: DashMap<String, InterestSpec>,
}

impl GraphInterestResolver {
    pub fn new(config: &InterestServiceConfig, access_token: impl Into<String>) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PipelineError::InterestLookup(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            access_token: access_token.into(),
            cache: DashMap::new(),
        })
    }

    async fn search(&self, name: &str) -> PipelineResult<InterestSpec> {
        let key = name.to_ascii_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("type", "adinterest"),
                ("q", name),
                ("limit", "1"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::InterestLookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| PipelineError::InterestLookup(e.to_string()))?;

        let body: InterestSearchResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::InterestLookup(e.to_string()))?;

        let spec = body
            .data
            .into_iter()
            .next()
            .map(|hit| InterestSpec {
                id: hit.id,
                name: hit.name,
            })
            .unwrap_or_else(|| InterestSpec {
                id: PLACEHOLDER_INTEREST_ID.to_string(),
                name: name.to_string(),
            });

        debug!(interest = name, id = %spec.id, "resolved interest");
        self.cache.insert(key, spec.clone());
        Ok(spec)
    }
}

#[async_trait]
impl InterestResolver for GraphInterestResolver {
    async fn resolve(&self, names: &[String]) -> PipelineResult<Vec<InterestSpec>> {
        let mut specs = Vec::new();
        for name in dedup_names(names) {
            specs.push(self.search(&name).await?);
        }
        Ok(specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_order_case_insensitively() {
        let names = vec![
            "Yoga".to_string(),
            "yoga".to_string(),
            " Running".to_string(),
            "".to_string(),
            "Yoga ".to_string(),
        ];
        assert_eq!(dedup_names(&names), vec!["Yoga", "Running"]);
    }

    #[test]
    fn test_placeholder_interests_are_name_only() {
        let specs = placeholder_interests(&["Cycling".to_string()]);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id, PLACEHOLDER_INTEREST_ID);
        assert_eq!(specs[0].name, "Cycling");
    }
}
