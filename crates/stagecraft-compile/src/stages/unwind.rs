//! Unwind stage: a normalized array path plus two optional flags.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::coerce::{field_reference, is_truthy};
use crate::stages::{StageBody, StageCompiler};

pub struct UnwindCompiler;

impl StageCompiler for UnwindCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Unwind
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let path = config
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        if path.is_empty() {
            return Ok(StageBody::Empty);
        }

        let mut body = Map::new();
        body.insert("path".to_string(), Value::String(field_reference(path)));

        // Both options are omitted from the body when falsy or empty.
        if config.get("preserveNullAndEmptyArrays").is_some_and(is_truthy) {
            body.insert("preserveNullAndEmptyArrays".to_string(), Value::Bool(true));
        }
        if let Some(index_name) = config.get("includeArrayIndex").and_then(Value::as_str) {
            let index_name = index_name.trim();
            if !index_name.is_empty() {
                body.insert(
                    "includeArrayIndex".to_string(),
                    Value::String(index_name.to_string()),
                );
            }
        }

        Ok(StageBody::Compiled(Value::Object(body)))
    }
}
