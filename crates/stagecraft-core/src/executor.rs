//! The live-collection capability.
//!
//! This trait is the only point where the core touches an external system.
//! The orchestrator issues two read-only fetches per prefix — a bounded
//! preview page and the true total count — and may run them concurrently,
//! so they are separate methods rather than one combined call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;
use crate::stage::{Document, Pipeline};

pub type ExecutorResult<T> = Result<T, RuntimeError>;

/// Where to run: data-source location plus target collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Data-source location, e.g. a connection URI
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl ConnectionInfo {
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }
}

/// Capability for executing pipeline prefixes against a live collection.
///
/// Implementations are injected into the orchestrator as `Arc<dyn
/// CollectionExecutor>`; tests use an in-memory mock.
#[async_trait]
pub trait CollectionExecutor: Send + Sync {
    /// Execute `prefix` and return at most `limit` result documents.
    ///
    /// The bound applies to the preview page only; it must not be pushed
    /// into the pipeline itself.
    async fn preview(
        &self,
        prefix: &Pipeline,
        collection: &str,
        limit: usize,
    ) -> ExecutorResult<Vec<Document>>;

    /// Execute `prefix` and return the true total matched count.
    async fn count(&self, prefix: &Pipeline, collection: &str) -> ExecutorResult<u64>;
}
