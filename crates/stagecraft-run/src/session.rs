//! Single-writer session state.
//!
//! One session owns the editable graph, the pipeline derived from it, and
//! the most recent accepted run. Nothing is shared across sessions, so no
//! locking beyond the coordinator's own bookkeeping is needed.

use std::sync::Arc;

use tracing::debug;

use stagecraft_compile::{export, Assembler, ExportFormat};
use stagecraft_core::{
    CollectionExecutor, CompileError, ConnectionInfo, ExportError, Node, NodeId, PipelineRun,
    Pipeline, StageConfig, StageGraph,
};

use crate::runner::{PipelineRunner, RunnerConfig};

/// The builder's compile-and-run surface for one connected collection.
///
/// Graph edits go through the session so an in-flight run is superseded
/// the moment its inputs change; the compiled pipeline is re-derived
/// lazily whenever the graph revision moves.
pub struct Session {
    graph: StageGraph,
    assembler: Assembler,
    runner: PipelineRunner,
    connection: ConnectionInfo,
    /// Pipeline compiled at a specific graph revision
    compiled: Option<(u64, Pipeline)>,
}

impl Session {
    pub fn new(executor: Arc<dyn CollectionExecutor>, connection: ConnectionInfo) -> Self {
        Self::with_config(executor, connection, RunnerConfig::default())
    }

    pub fn with_config(
        executor: Arc<dyn CollectionExecutor>,
        connection: ConnectionInfo,
        config: RunnerConfig,
    ) -> Self {
        Self {
            graph: StageGraph::new(),
            assembler: Assembler::new(),
            runner: PipelineRunner::with_config(executor, config),
            connection,
            compiled: None,
        }
    }

    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }

    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    // ------------------------------------------------------------------
    // Graph edits. Each one supersedes whatever run is in flight.
    // ------------------------------------------------------------------

    pub fn add_stage(&mut self, node: Node) -> NodeId {
        let id = self.graph.add_node(node);
        self.invalidate();
        id
    }

    pub fn remove_stage(&mut self, id: &str) -> bool {
        let removed = self.graph.remove_node(id);
        if removed {
            self.invalidate();
        }
        removed
    }

    pub fn connect(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        self.graph.add_edge(source, target);
        self.invalidate();
    }

    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        let removed = self.graph.remove_edge(source, target);
        if removed {
            self.invalidate();
        }
        removed
    }

    pub fn configure(&mut self, id: &str, config: StageConfig) -> bool {
        let changed = self.graph.set_config(id, config);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Replace the whole graph, e.g. from a UI state push.
    pub fn replace_graph(&mut self, graph: StageGraph) {
        self.graph = graph;
        self.compiled = None;
        self.runner.coordinator().invalidate();
    }

    fn invalidate(&mut self) {
        debug!(revision = self.graph.revision(), "graph edited, pipeline stale");
        self.runner.coordinator().invalidate();
    }

    // ------------------------------------------------------------------
    // Derived artifacts
    // ------------------------------------------------------------------

    /// The pipeline for the current graph, recompiling only when stale.
    ///
    /// On failure the offending node (if any) is flagged with a short
    /// message and the stale run is cleared so downstream consumers never
    /// show results for an invalid graph.
    pub fn pipeline(&mut self) -> Result<Pipeline, CompileError> {
        let revision = self.graph.revision();
        if let Some((compiled_at, pipeline)) = &self.compiled {
            if *compiled_at == revision {
                return Ok(pipeline.clone());
            }
        }

        let ids: Vec<NodeId> = self.graph.nodes().iter().map(|n| n.id.clone()).collect();
        for id in &ids {
            self.graph.set_error(id, None);
        }

        match self.assembler.assemble(&self.graph) {
            Ok(pipeline) => {
                self.compiled = Some((revision, pipeline.clone()));
                Ok(pipeline)
            }
            Err(error) => {
                if let Some(node) = error.node() {
                    let node = node.clone();
                    self.graph.set_error(&node, Some(error.to_string()));
                }
                self.compiled = None;
                self.runner.coordinator().clear();
                Err(error)
            }
        }
    }

    /// Compile and progressively execute the current graph.
    ///
    /// Structural and validation failures are returned without ever
    /// touching the live collection; runtime failures come back inside
    /// the run, attributed to their node.
    pub async fn execute(&mut self) -> Result<PipelineRun, CompileError> {
        let pipeline = self.pipeline()?;
        let run = self
            .runner
            .run(&pipeline, &self.connection.collection)
            .await;

        if let Some(failed) = run.failed_stage() {
            if let Some(error) = &failed.error {
                self.graph.set_error(&failed.node_id, Some(error.to_string()));
            }
        }
        Ok(run)
    }

    /// The most recent run that survived generation filtering.
    pub fn last_run(&self) -> Option<PipelineRun> {
        self.runner.coordinator().latest()
    }

    /// Render the current pipeline in one of the fixed output formats.
    pub fn export(&mut self, format: ExportFormat) -> Result<String, SessionExportError> {
        let pipeline = self.pipeline()?;
        let text = export(&pipeline, &self.connection.collection, format)?;
        Ok(text)
    }
}

/// Export can fail either at compile time or at render time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionExportError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Render(#[from] ExportError),
}
