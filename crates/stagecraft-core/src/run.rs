//! Results of one progressive pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::graph::NodeId;
use crate::stage::Document;

/// Outcome of one `prefix(k)` execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageExecutionResult {
    /// Zero-based index of the prefix's last stage
    pub stage_index: usize,
    /// Graph node that owns the prefix's last stage
    pub node_id: NodeId,
    /// Bounded preview page, independent of any `$limit` inside the pipeline
    pub documents: Vec<Document>,
    /// True total matched count for this prefix
    pub count: u64,
    /// Wall-clock time for the prefix
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RuntimeError>,
}

impl StageExecutionResult {
    pub fn succeeded(
        stage_index: usize,
        node_id: impl Into<NodeId>,
        documents: Vec<Document>,
        count: u64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            stage_index,
            node_id: node_id.into(),
            documents,
            count,
            elapsed_ms,
            error: None,
        }
    }

    pub fn failed(
        stage_index: usize,
        node_id: impl Into<NodeId>,
        error: RuntimeError,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            stage_index,
            node_id: node_id.into(),
            documents: Vec::new(),
            count: 0,
            elapsed_ms,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Every prefix executed
    Completed,
    /// A prefix failed; later prefixes were not attempted
    Failed,
    /// A newer generation started while this run was in flight
    Superseded,
}

/// One progressive execution of an assembled pipeline: one result per
/// prefix length, terminating at the first failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    /// Generation token this run was started under
    pub generation: u64,
    pub collection: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<StageExecutionResult>,
    pub outcome: RunOutcome,
}

impl PipelineRun {
    pub fn new(generation: u64, collection: impl Into<String>) -> Self {
        Self {
            generation,
            collection: collection.into(),
            started_at: Utc::now(),
            results: Vec::new(),
            outcome: RunOutcome::Completed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// The failing result, if the run halted on one.
    pub fn failed_stage(&self) -> Option<&StageExecutionResult> {
        self.results.iter().find(|r| !r.is_success())
    }

    /// Results that executed successfully, in prefix order.
    pub fn succeeded(&self) -> impl Iterator<Item = &StageExecutionResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.results.iter().map(|r| r.elapsed_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_halts_shape() {
        let mut run = PipelineRun::new(1, "orders");
        run.results
            .push(StageExecutionResult::succeeded(0, "a", Vec::new(), 12, 3));
        run.results
            .push(StageExecutionResult::succeeded(1, "b", Vec::new(), 12, 2));
        run.results.push(StageExecutionResult::failed(
            2,
            "c",
            RuntimeError::Rejected("unknown operator".to_string()),
            1,
        ));
        run.outcome = RunOutcome::Failed;

        assert!(!run.is_complete());
        assert_eq!(run.results.len(), 3);
        assert_eq!(run.succeeded().count(), 2);
        assert_eq!(run.failed_stage().unwrap().node_id, "c");
        assert_eq!(run.total_elapsed_ms(), 6);
    }

    #[test]
    fn test_run_serializes_without_error_field_on_success() {
        let result = StageExecutionResult::succeeded(0, "a", Vec::new(), 1, 1);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["stageIndex"], 0);
    }
}
