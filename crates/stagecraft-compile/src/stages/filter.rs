//! Filter stage: an ordered list of {field, operator, value} conditions.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::coerce::{coerce_list, coerce_value, is_truthy};
use crate::stages::{StageBody, StageCompiler};

/// Operator names accepted in filter rows, paired with their compiled
/// tokens. `equals` is special-cased to the flat form.
const OPERATOR_TOKENS: &[(&str, &str)] = &[
    ("not-equals", "$ne"),
    ("greater-than", "$gt"),
    ("greater-or-equal", "$gte"),
    ("less-than", "$lt"),
    ("less-or-equal", "$lte"),
    ("in", "$in"),
    ("not-in", "$nin"),
    ("regex", "$regex"),
    ("exists", "$exists"),
];

pub struct FilterCompiler;

impl FilterCompiler {
    /// Compile one usable row into the body map.
    fn compile_row(
        body: &mut Map<String, Value>,
        field: &str,
        operator: &str,
        value: &Value,
    ) -> Result<(), ValidationError> {
        if operator == "equals" {
            body.insert(field.to_string(), coerce_value(value));
            return Ok(());
        }

        let token = OPERATOR_TOKENS
            .iter()
            .find(|(name, _)| *name == operator)
            .map(|(_, token)| *token)
            .ok_or_else(|| {
                ValidationError::new("operator", format!("unknown operator '{operator}'"))
            })?;

        let compiled_value = match token {
            "$in" | "$nin" => match value {
                Value::String(s) => coerce_list(s),
                Value::Array(items) => Value::Array(items.iter().map(coerce_value).collect()),
                other => Value::Array(vec![coerce_value(other)]),
            },
            "$exists" => Value::Bool(is_truthy(value)),
            "$regex" => Value::String(value.as_str().unwrap_or_default().to_string()),
            _ => coerce_value(value),
        };

        let mut wrapped = Map::new();
        wrapped.insert(token.to_string(), compiled_value);
        body.insert(field.to_string(), Value::Object(wrapped));
        Ok(())
    }
}

impl StageCompiler for FilterCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Filter
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let rows = match config.get("conditions") {
            None | Some(Value::Null) => return Ok(StageBody::Empty),
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(ValidationError::new("conditions", "must be a list")),
        };

        let mut body = Map::new();
        for row in rows {
            let field = row
                .get("field")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim();
            let value = row.get("value").unwrap_or(&Value::Null);
            let value_is_empty =
                matches!(value, Value::Null) || value.as_str().is_some_and(|s| s.is_empty());

            // Rows with an empty field or empty value are skipped entirely.
            if field.is_empty() || value_is_empty {
                continue;
            }

            let operator = row
                .get("operator")
                .and_then(Value::as_str)
                .unwrap_or("equals");
            Self::compile_row(&mut body, field, operator, value)?;
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
    use test_case::test_case;

    fn compile(conditions: Value) -> Result<StageBody, ValidationError> {
        let mut config = StageConfig::new();
        config.insert("conditions".to_string(), conditions);
        FilterCompiler.compile(&config)
    }

    fn compiled(conditions: Value) -> Value {
        match compile(conditions).unwrap() {
            StageBody::Compiled(body) => body,
            StageBody::Empty => panic!("expected a compiled body"),
        }
    }

    #[test]
    fn test_missing_conditions_is_unconfigured() {
        assert_eq!(FilterCompiler.compile(&StageConfig::new()).unwrap(), StageBody::Empty);
    }

    #[test]
    fn test_equals_compiles_flat() {
        let body = compiled(json!([
            { "field": "age", "operator": "equals", "value": "21" }
        ]));
        assert_eq!(body, json!({ "age": 21 }));
    }

    #[test_case("not-equals", "$ne"; "ne")]
    #[test_case("greater-than", "$gt"; "gt")]
    #[test_case("greater-or-equal", "$gte"; "gte")]
    #[test_case("less-than", "$lt"; "lt")]
    #[test_case("less-or-equal", "$lte"; "lte")]
    fn test_comparison_operators_wrap(operator: &str, token: &str) {
        let body = compiled(json!([
            { "field": "age", "operator": operator, "value": "21" }
        ]));
        assert_eq!(body, json!({ "age": { token: 21 } }));
    }

    #[test]
    fn test_empty_rows_are_skipped_entirely() {
        let body = compiled(json!([
            { "field": "status", "operator": "equals", "value": "active" },
            { "field": "", "operator": "equals", "value": "x" },
            { "field": "age", "operator": "equals", "value": "" }
        ]));
        assert_eq!(body, json!({ "status": "active" }));
    }

    #[test]
    fn test_all_rows_empty_is_unconfigured() {
        let outcome = compile(json!([
            { "field": "", "operator": "equals", "value": "x" }
        ]));
        assert_eq!(outcome.unwrap(), StageBody::Empty);
    }

    #[test]
    fn test_value_coercion_order() {
        let body = compiled(json!([
            { "field": "n", "operator": "equals", "value": "42" },
            { "field": "ok", "operator": "equals", "value": "FALSE" },
            { "field": "name", "operator": "equals", "value": "abc" }
        ]));
        assert_eq!(body, json!({ "n": 42, "ok": false, "name": "abc" }));
    }

    #[test]
    fn test_in_splits_comma_separated_values() {
        let body = compiled(json!([
            { "field": "status", "operator": "in", "value": "active, pending, 3" }
        ]));
        assert_eq!(body, json!({ "status": { "$in": ["active", "pending", 3] } }));
    }

    #[test]
    fn test_not_in_token() {
        let body = compiled(json!([
            { "field": "tier", "operator": "not-in", "value": "free" }
        ]));
        assert_eq!(body, json!({ "tier": { "$nin": ["free"] } }));
    }

    #[test]
    fn test_regex_value_stays_a_string() {
        let body = compiled(json!([
            { "field": "sku", "operator": "regex", "value": "^42" }
        ]));
        assert_eq!(body, json!({ "sku": { "$regex": "^42" } }));
    }

    #[test]
    fn test_exists_coerces_to_boolean() {
        let body = compiled(json!([
            { "field": "email", "operator": "exists", "value": "true" },
            { "field": "phone", "operator": "exists", "value": "false" }
        ]));
        assert_eq!(
            body,
            json!({ "email": { "$exists": true }, "phone": { "$exists": false } })
        );
    }

    #[test]
    fn test_unknown_operator_is_a_validation_error() {
        let err = compile(json!([
            { "field": "a", "operator": "similar-to", "value": "x" }
        ]))
        .unwrap_err();
        assert_eq!(err.field, "operator");
    }

    #[test]
    fn test_compile_is_idempotent() {
        let conditions = json!([
            { "field": "status", "operator": "equals", "value": "active" }
        ]);
        assert_eq!(compile(conditions.clone()).unwrap(), compile(conditions).unwrap());
    }
}
