//! Group stage: a group-by key plus named accumulators.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::coerce::field_reference;
use crate::stages::{StageBody, StageCompiler};

/// Accumulator operator names and their tokens. `count` is rewritten to a
/// sum of ones and takes no field.
const ACCUMULATOR_TOKENS: &[(&str, &str)] = &[
    ("sum", "$sum"),
    ("avg", "$avg"),
    ("min", "$min"),
    ("max", "$max"),
    ("first", "$first"),
    ("last", "$last"),
    ("push", "$push"),
];

pub struct GroupCompiler;

impl StageCompiler for GroupCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Group
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let group_by = config
            .get("groupBy")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let rows: &[Value] = match config.get("accumulators") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(ValidationError::new("accumulators", "must be a list")),
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

            let operator = row
                .get("operator")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let mut accumulator = Map::new();
            if operator == "count" {
                accumulator.insert("$sum".to_string(), Value::from(1));
            } else {
                let token = ACCUMULATOR_TOKENS
                    .iter()
                    .find(|(op, _)| *op == operator)
                    .map(|(_, token)| *token)
                    .ok_or_else(|| {
                        ValidationError::new(
                            "operator",
                            format!("unknown accumulator '{operator}'"),
                        )
                    })?;
                let field = row
                    .get("field")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim();
                if field.is_empty() {
                    continue;
                }
                accumulator.insert(token.to_string(), Value::String(field_reference(field)));
            }
            body.insert(name.to_string(), Value::Object(accumulator));
        }

        if group_by.is_empty() && body.is_empty() {
            return Ok(StageBody::Empty);
        }

        // _id leads the body: null collapses everything into one group.
        let id_value = if group_by.is_empty() {
            Value::Null
        } else {
            Value::String(field_reference(&group_by))
        };
        let mut full = Map::new();
        full.insert("_id".to_string(), id_value);
        full.extend(body);
        Ok(StageBody::Compiled(Value::Object(full)))
    }
}
