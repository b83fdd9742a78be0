//! Project stage: ordered {name, mode} rows with optional computed
//! expressions.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::coerce::coerce_expression;
use crate::stages::{StageBody, StageCompiler};

pub struct ProjectCompiler;

impl StageCompiler for ProjectCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Project
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let rows = match config.get("fields") {
            None | Some(Value::Null) => return Ok(StageBody::Empty),
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(ValidationError::new("fields", "must be a list")),
        };

        let mut body = Map::new();
        for row in rows {
            let name = row
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim();
            if name.is_empty() {
                continue;
            }

            let mode = row.get("mode").and_then(Value::as_str).unwrap_or("include");
            let value = match mode {
                "include" => Value::from(1),
                "exclude" => Value::from(0),
                "computed" => {
                    let expression = row
                        .get("expression")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if expression.trim().is_empty() {
                        // A computed field without an expression is not
                        // usable yet; treat the row as unfinished.
                        continue;
                    }
                    coerce_expression(expression)
                }
                other => {
                    return Err(ValidationError::new(
                        "mode",
                        format!("unknown projection mode '{other}'"),
                    ))
                }
            };
            body.insert(name.to_string(), value);
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
        ProjectCompiler.compile(&config)
    }

    #[test]
    fn test_include_exclude_modes() {
        let outcome = compile(json!([
            { "name": "name", "mode": "include" },
            { "name": "secret", "mode": "exclude" }
        ]))
        .unwrap();
        assert_eq!(outcome, StageBody::Compiled(json!({ "name": 1, "secret": 0 })));
    }

    #[test]
    fn test_computed_expressions() {
        let outcome = compile(json!([
            { "name": "price", "mode": "computed", "expression": "$cost" },
            { "name": "flagged", "mode": "computed", "expression": "true" },
            { "name": "version", "mode": "computed", "expression": "2" },
            { "name": "label", "mode": "computed", "expression": "beta" }
        ]))
        .unwrap();
        assert_eq!(
            outcome,
            StageBody::Compiled(json!({
                "price": "$cost",
                "flagged": true,
                "version": 2,
                "label": "beta"
            }))
        );
    }

    #[test]
    fn test_default_config_compiles_to_id_inclusion() {
        let config = StageType::Project.default_config();
        assert_eq!(
            ProjectCompiler.compile(&config).unwrap(),
            StageBody::Compiled(json!({ "_id": 1 }))
        );
    }

    #[test]
    fn test_unnamed_and_unfinished_rows_skipped() {
        let outcome = compile(json!([
            { "name": "", "mode": "include" },
            { "name": "total", "mode": "computed", "expression": "" },
            { "name": "kept", "mode": "include" }
        ]))
        .unwrap();
        assert_eq!(outcome, StageBody::Compiled(json!({ "kept": 1 })));
    }

    #[test]
    fn test_unknown_mode_is_a_validation_error() {
        let err = compile(json!([{ "name": "x", "mode": "rename" }])).unwrap_err();
        assert_eq!(err.field, "mode");
    }

    #[test]
    fn test_missing_fields_key_is_unconfigured() {
        assert_eq!(
            ProjectCompiler.compile(&StageConfig::new()).unwrap(),
            StageBody::Empty
        );
    }
}
