//! Node.js driver-call exporter.

use serde_json::Value;

use stagecraft_core::{ExportError, Pipeline};

use crate::render::{write_value, ExportFormat, LiteralStyle, PipelineExporter};

pub struct NodeDriverExporter;

impl PipelineExporter for NodeDriverExporter {
    fn name(&self) -> &'static str {
        "node-driver"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::NodeDriver
    }

    fn export(&self, pipeline: &Pipeline, collection: &str) -> Result<String, ExportError> {
        let style = LiteralStyle::JS;
        let stages = write_value(&Value::Array(pipeline.documents()), &style, 0);
        Ok(format!(
            "const pipeline = {stages};\n\nconst cursor = db.collection({}).aggregate(pipeline);",
            style.string(collection)
        ))
    }
}
