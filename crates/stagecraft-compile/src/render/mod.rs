//! Pipeline exporters.
//!
//! Exporters turn an assembled pipeline into one of the fixed textual
//! output formats. They are pure: stage order and parameter values are
//! preserved exactly, and only quoting conventions differ per format.

mod node_driver;
mod python;
mod shell;

pub use node_driver::NodeDriverExporter;
pub use python::PythonExporter;
pub use shell::ShellExporter;

use serde_json::Value;

use stagecraft_core::{ExportError, Pipeline};

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Interactive console syntax
    Shell,
    /// Driver-call syntax for a Node.js program
    NodeDriver,
    /// Scripting-language syntax for Python
    Python,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 3] {
        [
            ExportFormat::Shell,
            ExportFormat::NodeDriver,
            ExportFormat::Python,
        ]
    }
}

/// Trait for rendering a pipeline to one output format.
pub trait PipelineExporter: Send + Sync {
    /// Unique name for this exporter
    fn name(&self) -> &'static str;

    fn format(&self) -> ExportFormat;

    /// Render the pipeline against the named collection.
    fn export(&self, pipeline: &Pipeline, collection: &str) -> Result<String, ExportError>;
}

/// The exporter for a format selector.
pub fn exporter_for(format: ExportFormat) -> Box<dyn PipelineExporter> {
    match format {
        ExportFormat::Shell => Box::new(ShellExporter),
        ExportFormat::NodeDriver => Box::new(NodeDriverExporter),
        ExportFormat::Python => Box::new(PythonExporter),
    }
}

/// Render `pipeline` for `collection` in the requested format.
pub fn export(
    pipeline: &Pipeline,
    collection: &str,
    format: ExportFormat,
) -> Result<String, ExportError> {
    exporter_for(format).export(pipeline, collection)
}

/// Literal-formatting conventions of one target language.
pub(crate) struct LiteralStyle {
    pub quote: char,
    pub true_token: &'static str,
    pub false_token: &'static str,
    pub null_token: &'static str,
    /// Emit identifier-safe object keys without quotes
    pub bare_keys: bool,
    pub indent: &'static str,
}

impl LiteralStyle {
    pub(crate) const JS: LiteralStyle = LiteralStyle {
        quote: '\'',
        true_token: "true",
        false_token: "false",
        null_token: "null",
        bare_keys: true,
        indent: "  ",
    };

    pub(crate) const PYTHON: LiteralStyle = LiteralStyle {
        quote: '\'',
        true_token: "True",
        false_token: "False",
        null_token: "None",
        bare_keys: false,
        indent: "    ",
    };

    pub(crate) fn string(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len() + 2);
        out.push(self.quote);
        for c in raw.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c == self.quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(self.quote);
        out
    }

    fn key(&self, raw: &str) -> String {
        if self.bare_keys && is_identifier(raw) {
            raw.to_string()
        } else {
            self.string(raw)
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render one value at `depth` nesting levels.
pub(crate) fn write_value(value: &Value, style: &LiteralStyle, depth: usize) -> String {
    match value {
        Value::Null => style.null_token.to_string(),
        Value::Bool(true) => style.true_token.to_string(),
        Value::Bool(false) => style.false_token.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => style.string(s),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner = style.indent.repeat(depth + 1);
            let rendered: Vec<String> = items
                .iter()
                .map(|item| format!("{inner}{}", write_value(item, style, depth + 1)))
                .collect();
            format!(
                "[\n{}\n{}]",
                rendered.join(",\n"),
                style.indent.repeat(depth)
            )
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let inner = style.indent.repeat(depth + 1);
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, item)| {
                    format!(
                        "{inner}{}: {}",
                        style.key(key),
                        write_value(item, style, depth + 1)
                    )
                })
                .collect();
            format!(
                "{{\n{}\n{}}}",
                rendered.join(",\n"),
                style.indent.repeat(depth)
            )
        }
    }
}
