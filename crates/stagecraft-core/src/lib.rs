//! Core domain types for the stagecraft pipeline builder.
//!
//! This crate holds everything the compile and run layers share:
//!
//! - the editable stage graph (`graph`) as it arrives from the UI,
//! - compiled stages and pipelines (`stage`),
//! - per-prefix execution results (`run`),
//! - the error taxonomy (`error`),
//! - the live-collection capability trait (`executor`).
//!
//! Nothing in this crate performs I/O. Every type that crosses a boundary
//! (graph in, pipeline/run out) is JSON-serializable.

pub mod error;
pub mod executor;
pub mod graph;
pub mod run;
pub mod stage;

pub use error::{
    CompileError, ExportError, RuntimeError, StructuralError, ValidationError,
};
pub use executor::{CollectionExecutor, ConnectionInfo, ExecutorResult};
pub use graph::{Edge, Node, NodeId, Position, StageGraph};
pub use run::{PipelineRun, RunOutcome, StageExecutionResult};
pub use stage::{CompiledStage, Document, Pipeline, StageConfig, StageType};
