//! Stage types, compiled stages, and assembled pipelines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::NodeId;

/// A preview document returned by the data store.
pub type Document = Map<String, Value>;

/// Raw stage configuration as edited by the UI.
///
/// The core never interprets this map directly; each stage compiler reads
/// the keys it knows about and validates them on every compile.
pub type StageConfig = Map<String, Value>;

/// The fixed set of stage operators the builder supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageType {
    Filter,
    Sort,
    Limit,
    Skip,
    Project,
    Unwind,
    Lookup,
    Group,
    AddFields,
    Count,
}

impl StageType {
    /// The operator token this stage compiles to.
    pub fn operator(&self) -> &'static str {
        match self {
            StageType::Filter => "$match",
            StageType::Sort => "$sort",
            StageType::Limit => "$limit",
            StageType::Skip => "$skip",
            StageType::Project => "$project",
            StageType::Unwind => "$unwind",
            StageType::Lookup => "$lookup",
            StageType::Group => "$group",
            StageType::AddFields => "$addFields",
            StageType::Count => "$count",
        }
    }

    /// All supported stage types, in palette order.
    pub fn all() -> [StageType; 10] {
        [
            StageType::Filter,
            StageType::Sort,
            StageType::Limit,
            StageType::Skip,
            StageType::Project,
            StageType::Unwind,
            StageType::Lookup,
            StageType::Group,
            StageType::AddFields,
            StageType::Count,
        ]
    }

    /// Configuration a node of this type starts with when dropped on the
    /// canvas. A fresh Project node includes `_id`; everything else starts
    /// unconfigured.
    pub fn default_config(&self) -> StageConfig {
        let mut config = StageConfig::new();
        if let StageType::Project = self {
            let mut row = Map::new();
            row.insert("name".to_string(), Value::String("_id".to_string()));
            row.insert("mode".to_string(), Value::String("include".to_string()));
            config.insert("fields".to_string(), Value::Array(vec![Value::Object(row)]));
        }
        config
    }
}

/// A validated, typed stage ready for execution or export.
///
/// Immutable once produced; compiling identical config twice yields an
/// identical `CompiledStage`. The owning node id is carried so runtime
/// failures can be attributed back to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStage {
    /// Graph node this stage was compiled from
    pub node_id: NodeId,
    /// Operator token, e.g. `$match`
    pub operator: String,
    /// Stage body; field order is preserved where it is semantic
    pub body: Value,
}

impl CompiledStage {
    pub fn new(node_id: impl Into<NodeId>, stage_type: StageType, body: Value) -> Self {
        Self {
            node_id: node_id.into(),
            operator: stage_type.operator().to_string(),
            body,
        }
    }

    /// The single-key document form `{ "$op": body }` used on the wire.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(self.operator.clone(), self.body.clone());
        Value::Object(doc)
    }
}

/// An ordered sequence of compiled stages.
///
/// A pipeline only exists for a currently valid linear graph; it is a
/// derived artifact and is recomputed whenever the graph changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<CompiledStage>,
}

impl Pipeline {
    pub fn new(stages: Vec<CompiledStage>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The first `k` stages as their own pipeline.
    ///
    /// `prefix(k)` equals `prefix(k + 1)` minus its last stage.
    pub fn prefix(&self, k: usize) -> Pipeline {
        Pipeline {
            stages: self.stages.iter().take(k).cloned().collect(),
        }
    }

    /// Every prefix, shortest first: `prefix(1)` through `prefix(len())`.
    pub fn prefixes(&self) -> impl Iterator<Item = Pipeline> + '_ {
        (1..=self.stages.len()).map(|k| self.prefix(k))
    }

    /// Stage documents in order, the wire form of the whole pipeline.
    pub fn documents(&self) -> Vec<Value> {
        self.stages.iter().map(CompiledStage::to_document).collect()
    }
}
