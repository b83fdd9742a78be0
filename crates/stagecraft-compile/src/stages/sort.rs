//! Sort stage: ordered {field, direction} rows.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::stages::{StageBody, StageCompiler};

pub struct SortCompiler;

fn direction_value(direction: &Value) -> Result<i64, ValidationError> {
    match direction {
        Value::Null => Ok(1),
        Value::String(s) => match s.trim() {
            "" | "ascending" => Ok(1),
            "descending" => Ok(-1),
            other => Err(ValidationError::new(
                "direction",
                format!("unknown direction '{other}'"),
            )),
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(1),
            Some(-1) => Ok(-1),
            _ => Err(ValidationError::new("direction", "must be 1 or -1")),
        },
        _ => Err(ValidationError::new("direction", "must be 1 or -1")),
    }
}

impl StageCompiler for SortCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Sort
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let rows = match config.get("fields") {
            None | Some(Value::Null) => return Ok(StageBody::Empty),
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(ValidationError::new("fields", "must be a list")),
        };

        // Insertion order is the user's sort-key order and is semantic.
        let mut body = Map::new();
        for row in rows {
            let field = row
                .get("field")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim();
            if field.is_empty() {
                continue;
            }
            let direction = direction_value(row.get("direction").unwrap_or(&Value::Null))?;
            body.insert(field.to_string(), Value::from(direction));
        }

        if body.is_empty() {
            return Ok(StageBody::Empty);
        }
        Ok(StageBody::Compiled(Value::Object(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(fields: Value) -> Result<StageBody, ValidationError> {
        let mut config = StageConfig::new();
        config.insert("fields".to_string(), fields);
        SortCompiler.compile(&config)
    }

    #[test]
    fn test_directions_compile_to_signed_ones() {
        let outcome = compile(json!([
            { "field": "age", "direction": "descending" },
            { "field": "name", "direction": "ascending" }
        ]))
        .unwrap();
        assert_eq!(
            outcome,
            StageBody::Compiled(json!({ "age": -1, "name": 1 }))
        );
    }

    #[test]
    fn test_field_order_is_preserved() {
        let StageBody::Compiled(body) = compile(json!([
            { "field": "z", "direction": "ascending" },
            { "field": "a", "direction": "ascending" }
        ]))
        .unwrap() else {
            panic!("expected a compiled body");
        };
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_empty_field_rows_skipped() {
        let outcome = compile(json!([
            { "field": "", "direction": "ascending" },
            { "field": "age" }
        ]))
        .unwrap();
        assert_eq!(outcome, StageBody::Compiled(json!({ "age": 1 })));
    }

    #[test]
    fn test_missing_fields_key_is_unconfigured() {
        assert_eq!(SortCompiler.compile(&StageConfig::new()).unwrap(), StageBody::Empty);
    }

    #[test]
    fn test_numeric_directions_accepted() {
        let outcome = compile(json!([{ "field": "age", "direction": -1 }])).unwrap();
        assert_eq!(outcome, StageBody::Compiled(json!({ "age": -1 })));
    }

    #[test]
    fn test_bad_direction_is_a_validation_error() {
        let err = compile(json!([{ "field": "age", "direction": "sideways" }])).unwrap_err();
        assert_eq!(err.field, "direction");
    }
}
