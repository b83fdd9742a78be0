//! The per-prefix execution loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use stagecraft_core::{
    CollectionExecutor, Pipeline, PipelineRun, RunOutcome, RuntimeError, StageExecutionResult,
};

use crate::coordinator::RunCoordinator;

/// Tunables for one runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Preview page size per prefix. Never pushed into the pipeline, so a
    /// user `$limit` stage cannot change it.
    pub preview_limit: usize,
    /// Latency bound per prefix against a slow external collection
    pub prefix_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            preview_limit: 20,
            prefix_timeout: Duration::from_secs(10),
        }
    }
}

/// Executes every prefix of an assembled pipeline, sequentially, against
/// an injected collection capability.
///
/// Prefixes are evaluated independently — a later stage may expand
/// cardinality (unwind, lookup), so no prefix reuses an earlier prefix's
/// result set.
pub struct PipelineRunner {
    executor: Arc<dyn CollectionExecutor>,
    coordinator: Arc<RunCoordinator>,
    config: RunnerConfig,
}

impl PipelineRunner {
    pub fn new(executor: Arc<dyn CollectionExecutor>) -> Self {
        Self::with_config(executor, RunnerConfig::default())
    }

    pub fn with_config(executor: Arc<dyn CollectionExecutor>, config: RunnerConfig) -> Self {
        Self {
            executor,
            coordinator: Arc::new(RunCoordinator::new()),
            config,
        }
    }

    pub fn coordinator(&self) -> Arc<RunCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the whole pipeline progressively under a fresh generation and
    /// commit the outcome. The returned run reflects what this call did;
    /// whether it stayed visible is the coordinator's decision.
    pub async fn run(&self, pipeline: &Pipeline, collection: &str) -> PipelineRun {
        let generation = self.coordinator.begin();
        let run = self.run_generation(pipeline, collection, generation).await;
        self.coordinator.commit(run.clone());
        run
    }

    async fn run_generation(
        &self,
        pipeline: &Pipeline,
        collection: &str,
        generation: u64,
    ) -> PipelineRun {
        let mut run = PipelineRun::new(generation, collection);
        info!(
            generation,
            stages = pipeline.len(),
            collection,
            "starting progressive run"
        );

        for (index, prefix) in pipeline.prefixes().enumerate() {
            // A graph edit bumps the generation; stop touching the store.
            if !self.coordinator.is_current(generation) {
                debug!(generation, prefix = index + 1, "run superseded, aborting");
                run.outcome = RunOutcome::Superseded;
                return run;
            }

            let result = self.execute_prefix(index, &prefix, collection).await;
            let failed = !result.is_success();
            if let Some(error) = &result.error {
                warn!(
                    generation,
                    node = %result.node_id,
                    %error,
                    "prefix failed, halting downstream prefixes"
                );
            }
            run.results.push(result);
            if failed {
                run.outcome = RunOutcome::Failed;
                return run;
            }
        }

        info!(
            generation,
            prefixes = run.results.len(),
            elapsed_ms = run.total_elapsed_ms(),
            "run completed"
        );
        run
    }

    /// Execute one prefix: bounded preview page and true total count,
    /// fetched concurrently, under the per-prefix timeout.
    async fn execute_prefix(
        &self,
        index: usize,
        prefix: &Pipeline,
        collection: &str,
    ) -> StageExecutionResult {
        // prefixes() never yields an empty pipeline
        let node_id = prefix
            .stages
            .last()
            .map(|s| s.node_id.clone())
            .unwrap_or_default();

        let started = Instant::now();
        let fetches = async {
            tokio::join!(
                self.executor
                    .preview(prefix, collection, self.config.preview_limit),
                self.executor.count(prefix, collection),
            )
        };

        match timeout(self.config.prefix_timeout, fetches).await {
            Err(_) => {
                let bound = self.config.prefix_timeout.as_millis() as u64;
                StageExecutionResult::failed(index, node_id, RuntimeError::Timeout(bound), bound)
            }
            Ok(outcome) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                match outcome {
                    (Ok(documents), Ok(count)) => {
                        debug!(
                            prefix = index + 1,
                            count, elapsed_ms, "prefix executed"
                        );
                        StageExecutionResult::succeeded(
                            index, node_id, documents, count, elapsed_ms,
                        )
                    }
                    (Err(error), _) | (_, Err(error)) => {
                        StageExecutionResult::failed(index, node_id, error, elapsed_ms)
                    }
                }
            }
        }
    }
}
