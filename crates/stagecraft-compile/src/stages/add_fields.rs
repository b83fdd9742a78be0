//! AddFields stage: a name-to-expression map.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::coerce::{coerce_expression, coerce_value};
use crate::stages::{StageBody, StageCompiler};

pub struct AddFieldsCompiler;

impl StageCompiler for AddFieldsCompiler {
    fn stage_type(&self) -> StageType {
        StageType::AddFields
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let fields = match config.get("fields") {
            None | Some(Value::Null) => return Ok(StageBody::Empty),
            Some(Value::Object(fields)) => fields,
            Some(_) => return Err(ValidationError::new("fields", "must be a map")),
        };

        let mut body = Map::new();
        for (name, expression) in fields {
            if name.trim().is_empty() {
                continue;
            }
            let value = match expression {
                Value::String(s) => {
                    if s.trim().is_empty() {
                        continue;
                    }
                    coerce_expression(s)
                }
                other => coerce_value(other),
            };
            body.insert(name.clone(), value);
        }

        if body.is_empty() {
            return Ok(StageBody::Empty);
        }
        Ok(StageBody::Compiled(Value::Object(body)))
    }
}
