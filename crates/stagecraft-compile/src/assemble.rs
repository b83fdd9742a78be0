//! Pipeline assembly: linearize, compile each node, concatenate.

use tracing::debug;

use stagecraft_core::{CompileError, Pipeline, StageGraph};

use crate::linearize::linearize;
use crate::stages::CompilerRegistry;

/// Compiles a whole graph into an ordered pipeline.
///
/// Unconfigured nodes are skipped rather than failing the pipeline; the
/// first hard validation error halts assembly, attributed to its node.
pub struct Assembler {
    registry: CompilerRegistry,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Assembler with the standard stage compilers.
    pub fn new() -> Self {
        Self {
            registry: CompilerRegistry::standard(),
        }
    }

    pub fn with_registry(registry: CompilerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CompilerRegistry {
        &self.registry
    }

    /// Compile `graph` into a pipeline, in source-to-sink order.
    pub fn assemble(&self, graph: &StageGraph) -> Result<Pipeline, CompileError> {
        let order = linearize(graph)?;

        let mut stages = Vec::with_capacity(order.len());
        for id in &order {
            let Some(node) = graph.node(id) else {
                // linearize only returns ids present in the graph
                continue;
            };
            if let Some(stage) = self.registry.compile_node(node)? {
                stages.push(stage);
            }
        }

        debug!(
            nodes = order.len(),
            stages = stages.len(),
            "assembled pipeline"
        );
        Ok(Pipeline::new(stages))
    }
}
