//! Progressive status reporting — trait for publishing pipeline progress
//! snapshots from the driver.
//!
//! The driver publishes a fresh snapshot after every stage transition so a
//! caller can poll (`CaptureSink`) or stream (`WatchSink`) incremental
//! status while the pipeline runs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ContentExtraction,
    SemanticAnalysis,
    AccountAudit,
    StrategyGeneration,
    AudienceConstruction,
    PlacementSelection,
    CreativeGeneration,
    BudgetAllocation,
    Orchestration,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentExtraction => "content_extraction",
            Self::SemanticAnalysis => "semantic_analysis",
            Self::AccountAudit => "account_audit",
            Self::StrategyGeneration => "strategy_generation",
            Self::AudienceConstruction => "audience_construction",
            Self::PlacementSelection => "placement_selection",
            Self::CreativeGeneration => "creative_generation",
            Self::BudgetAllocation => "budget_allocation",
            Self::Orchestration => "orchestration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Snapshot of one stage: status, a human-readable detail line, key metrics
/// and any warnings the stage surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub stage: PipelineStage,
    pub status: StageStatus,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// The progressive-status object consumed by the UI polling/streaming layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineProgress {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub current_step: Option<PipelineStage>,
    /// Keyed by stage name so the UI can index without ordering knowledge.
    pub steps: BTreeMap<String, StageSnapshot>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineProgress {
    pub fn new(run_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            status: RunStatus::Running,
            current_step: None,
            steps: BTreeMap::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }

    pub fn begin_stage(&mut self, stage: PipelineStage) {
        self.current_step = Some(stage);
        self.steps.insert(
            stage.as_str().to_string(),
            StageSnapshot {
                stage,
                status: StageStatus::Running,
                detail: None,
                metrics: BTreeMap::new(),
                warnings: Vec::new(),
                finished_at: None,
            },
        );
        self.updated_at = Utc::now();
    }

    pub fn complete_stage(
        &mut self,
        stage: PipelineStage,
        detail: impl Into<String>,
        metrics: BTreeMap<String, serde_json::Value>,
        warnings: Vec<String>,
    ) {
        self.warnings.extend(warnings.iter().cloned());
        self.steps.insert(
            stage.as_str().to_string(),
            StageSnapshot {
                stage,
                status: StageStatus::Completed,
                detail: Some(detail.into()),
                metrics,
                warnings,
                finished_at: Some(Utc::now()),
            },
        );
        self.updated_at = Utc::now();
    }

    /// Record a stage failure and flip the run into the failed state. Prior
    /// stage snapshots are retained so callers still see partial results.
    pub fn fail_stage(&mut self, stage: PipelineStage, error: impl Into<String>) {
        let error = error.into();
        self.errors.push(error.clone());
        self.status = RunStatus::Failed;
        self.steps.insert(
            stage.as_str().to_string(),
            StageSnapshot {
                stage,
                status: StageStatus::Failed,
                detail: Some(error),
                metrics: BTreeMap::new(),
                warnings: Vec::new(),
                finished_at: Some(Utc::now()),
            },
        );
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.current_step = None;
        self.updated_at = Utc::now();
    }
}

/// Trait for publishing progress snapshots. Implementations route snapshots
/// to a polling store, a watch channel, or nowhere at all.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, progress: &PipelineProgress);
}

/// No-op sink for tests and callers that don't track progress.
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn publish(&self, _progress: &PipelineProgress) {}
}

/// In-memory sink that captures every published snapshot for inspection.
#[derive(Default)]
pub struct CaptureSink {
    snapshots: Mutex<Vec<PipelineProgress>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshots(&self) -> Vec<PipelineProgress> {
        self.snapshots
            .lock()
            .expect("progress mutex poisoned")
            .clone()
    }

    pub fn latest(&self) -> Option<PipelineProgress> {
        self.snapshots
            .lock()
            .expect("progress mutex poisoned")
            .last()
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.snapshots.lock().expect("progress mutex poisoned").len()
    }
}

impl ProgressSink for CaptureSink {
    fn publish(&self, progress: &PipelineProgress) {
        self.snapshots
            .lock()
            .expect("progress mutex poisoned")
            .push(progress.clone());
    }
}

/// Sink backed by a `tokio::sync::watch` channel for streaming consumers.
pub struct WatchSink {
    tx: tokio::sync::watch::Sender<PipelineProgress>,
}

impl WatchSink {
    pub fn new(run_id: Uuid) -> (Self, tokio::sync::watch::Receiver<PipelineProgress>) {
        let (tx, rx) = tokio::sync::watch::channel(PipelineProgress::new(run_id));
        (Self { tx }, rx)
    }
}

impl ProgressSink for WatchSink {
    fn publish(&self, progress: &PipelineProgress) {
        // Receivers may have all dropped; publishing is best-effort.
        let _ = self.tx.send(progress.clone());
    }
}

/// Convenience: create a no-op sink for callers that don't need progress.
pub fn noop_sink() -> Arc<dyn ProgressSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests and polling callers.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
