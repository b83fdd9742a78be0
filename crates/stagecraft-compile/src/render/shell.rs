//! Interactive console exporter.

use serde_json::Value;

use stagecraft_core::{ExportError, Pipeline};

use crate::render::{write_value, ExportFormat, LiteralStyle, PipelineExporter};

pub struct ShellExporter;

impl PipelineExporter for ShellExporter {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Shell
    }

    fn export(&self, pipeline: &Pipeline, collection: &str) -> Result<String, ExportError> {
        let style = LiteralStyle::JS;
        let stages = write_value(&Value::Array(pipeline.documents()), &style, 0);
        Ok(format!(
            "db.getCollection({}).aggregate({stages})",
            style.string(collection)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::sample_pipeline;

    #[test]
    fn test_shell_output() {
        let text = ShellExporter.export(&sample_pipeline(), "orders").unwrap();
        let expected = "\
db.getCollection('orders').aggregate([
  {
    $match: {
      status: 'active',
      age: {
        $gte: 21
      }
    }
  },
  {
    $limit: 10
  }
])";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_pipeline() {
        let text = ShellExporter.export(&Pipeline::default(), "orders").unwrap();
        assert_eq!(text, "db.getCollection('orders').aggregate([])");
    }
}
