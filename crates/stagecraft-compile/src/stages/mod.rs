//! Per-stage-type compilers.
//!
//! Each stage type registers a [`StageCompiler`] in the
//! [`CompilerRegistry`]; the assembler dispatches on the node's stage type.
//! Compilers are pure functions of the raw config map and must be
//! idempotent.
//!
//! A compile has three outcomes:
//! - `Ok(StageBody::Compiled(..))` — a usable stage body,
//! - `Ok(StageBody::Empty)` — the node is recoverably unconfigured (a
//!   freshly dropped stage); the assembler skips it,
//! - `Err(ValidationError)` — a hard, field-level failure attributed to
//!   the node; assembly halts there.
//!
//! The rule of thumb: an absent config key means unconfigured, a present
//! but unusable one means invalid. Lookup is the one exception —
//! its required fields fail validation even when absent.

mod add_fields;
mod count;
mod filter;
mod group;
mod lookup;
mod paging;
mod project;
mod sort;
mod unwind;

pub use add_fields::AddFieldsCompiler;
pub use count::CountCompiler;
pub use filter::FilterCompiler;
pub use group::GroupCompiler;
pub use lookup::LookupCompiler;
pub use paging::{LimitCompiler, SkipCompiler};
pub use project::ProjectCompiler;
pub use sort::SortCompiler;
pub use unwind::UnwindCompiler;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use stagecraft_core::{
    CompileError, CompiledStage, Node, StageConfig, StageType, ValidationError,
};

/// Result of compiling one stage's configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum StageBody {
    /// A usable stage body
    Compiled(Value),
    /// Recoverably unconfigured; the assembler skips the node
    Empty,
}

/// Translates one stage type's raw config into a stage body.
pub trait StageCompiler: Send + Sync {
    /// The stage type this compiler handles
    fn stage_type(&self) -> StageType;

    /// Compile the config, or report a field-level validation error.
    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError>;
}

/// Dispatch table keyed by stage type.
pub struct CompilerRegistry {
    compilers: HashMap<StageType, Arc<dyn StageCompiler>>,
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CompilerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            compilers: HashMap::new(),
        }
    }

    /// Registry with every built-in stage compiler.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FilterCompiler));
        registry.register(Arc::new(SortCompiler));
        registry.register(Arc::new(LimitCompiler));
        registry.register(Arc::new(SkipCompiler));
        registry.register(Arc::new(ProjectCompiler));
        registry.register(Arc::new(UnwindCompiler));
        registry.register(Arc::new(LookupCompiler));
        registry.register(Arc::new(GroupCompiler));
        registry.register(Arc::new(AddFieldsCompiler));
        registry.register(Arc::new(CountCompiler));
        registry
    }

    /// Register a compiler, replacing any previous one for its stage type.
    pub fn register(&mut self, compiler: Arc<dyn StageCompiler>) {
        self.compilers.insert(compiler.stage_type(), compiler);
    }

    pub fn get(&self, stage_type: StageType) -> Option<&Arc<dyn StageCompiler>> {
        self.compilers.get(&stage_type)
    }

    /// Compile one graph node. `Ok(None)` means the node is unconfigured
    /// and should be skipped; errors carry the node's id.
    pub fn compile_node(&self, node: &Node) -> Result<Option<CompiledStage>, CompileError> {
        let compiler =
            self.compilers
                .get(&node.stage_type)
                .ok_or_else(|| CompileError::Validation {
                    node: node.id.clone(),
                    source: ValidationError::new("stageType", "has no registered compiler"),
                })?;

        match compiler.compile(&node.config) {
            Ok(StageBody::Compiled(body)) => {
                Ok(Some(CompiledStage::new(node.id.clone(), node.stage_type, body)))
            }
            Ok(StageBody::Empty) => {
                debug!(node = %node.id, stage = ?node.stage_type, "skipping unconfigured stage");
                Ok(None)
            }
            Err(source) => Err(CompileError::Validation {
                node: node.id.clone(),
                source,
            }),
        }
    }
}
