//! Graph-to-pipeline compilation for the stagecraft builder.
//!
//! The compile path runs in three steps:
//!
//! 1. **Linearize** ([`linearize`]): prove the editable graph is a single
//!    directed chain and order its nodes, or report a structural error.
//! 2. **Compile** ([`stages`]): translate each node's raw configuration
//!    into a validated stage body via a per-stage-type compiler registry.
//! 3. **Assemble** ([`assemble`]): concatenate the compiled stages, skip
//!    unconfigured nodes, attribute hard failures to their node, and hand
//!    out every prefix for progressive preview.
//!
//! [`render`] turns an assembled pipeline back into text for each of the
//! fixed export formats. Everything in this crate is pure: compiling the
//! same graph twice yields the same pipeline.

pub mod assemble;
pub mod coerce;
pub mod linearize;
pub mod render;
pub mod stages;

pub use assemble::Assembler;
pub use linearize::linearize;
pub use render::{export, ExportFormat, PipelineExporter};
pub use stages::{CompilerRegistry, StageBody, StageCompiler};
