//! Python scripting exporter.

use serde_json::Value;

use stagecraft_core::{ExportError, Pipeline};

use crate::render::{write_value, ExportFormat, LiteralStyle, PipelineExporter};

pub struct PythonExporter;

impl PipelineExporter for PythonExporter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Python
    }

    fn export(&self, pipeline: &Pipeline, collection: &str) -> Result<String, ExportError> {
        let style = LiteralStyle::PYTHON;
        let stages = write_value(&Value::Array(pipeline.documents()), &style, 0);
        Ok(format!(
            "pipeline = {stages}\n\ncursor = db[{}].aggregate(pipeline)",
            style.string(collection)
        ))
    }
}
