//! Count stage: a single output-field name.

use serde_json::Value;

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::stages::{StageBody, StageCompiler};

const DEFAULT_FIELD: &str = "total";

pub struct CountCompiler;

impl StageCompiler for CountCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Count
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let field = match config.get("field") {
            None | Some(Value::Null) => DEFAULT_FIELD,
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    DEFAULT_FIELD
                } else {
                    trimmed
                }
            }
            Some(_) => return Err(ValidationError::new("field", "must be a string")),
        };
        Ok(StageBody::Compiled(Value::String(field.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_name_defaults_to_total() {
        assert_eq!(
            CountCompiler.compile(&StageConfig::new()).unwrap(),
            StageBody::Compiled(json!("total"))
        );
    }

    #[test]
    fn test_custom_field_name() {
        let mut config = StageConfig::new();
        config.insert("field".to_string(), json!("matched"));
        assert_eq!(
            CountCompiler.compile(&config).unwrap(),
            StageBody::Compiled(json!("matched"))
        );
    }

    #[test]
    fn test_non_string_field_is_a_validation_error() {
        let mut config = StageConfig::new();
        config.insert("field".to_string(), json!(7));
        let err = CountCompiler.compile(&config).unwrap_err();
        assert_eq!(err.field, "field");
    }
}
