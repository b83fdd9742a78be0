//! Progressive pipeline execution.
//!
//! This crate orchestrates; it implements no data transformation itself.
//! Given an assembled pipeline and an injected [`CollectionExecutor`]
//! capability, the runner executes every prefix in order against the live
//! collection, collecting a bounded preview page, the true total count,
//! and wall-clock timing per prefix, halting at the first failure.
//!
//! Runs are cancellable through generation tokens: every run carries the
//! token it started under, a newer run bumps the shared generation, and
//! stale runs abort between prefixes and are discarded on commit. This
//! replaces ad hoc "loading" flags with an explicit contract: results from
//! an older generation can never overwrite newer ones.
//!
//! [`CollectionExecutor`]: stagecraft_core::CollectionExecutor

pub mod coordinator;
pub mod runner;
pub mod session;

pub use coordinator::RunCoordinator;
pub use runner::{PipelineRunner, RunnerConfig};
pub use session::{Session, SessionExportError};
